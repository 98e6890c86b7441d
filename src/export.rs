use std::{fs::OpenOptions, path::Path};
use tracing::debug;
use crate::{
  config::CONTENT_DELIMITER,
  error::Result,
  posts::uri::post_link,
  types::{ExtractedRow, PostRecord, Thread},
};

pub const HEADER: [&str; 2] = ["Extracted Text", "Post Link"];

/// the labeled text of a post: everything before the first `->`, trimmed.
/// `None` if the post has no `->`
pub fn extract_row(post: &PostRecord) -> Option<ExtractedRow> {
  let (extracted, _) = post.content.split_once(CONTENT_DELIMITER)?;
  Some(ExtractedRow {
    extracted_text: extracted.trim().to_string(),
    post_link: post_link(&post.author_handle, &post.uri),
  })
}

/// every row the threads produce, in thread order then post order
pub fn extract_rows(threads: &[Thread]) -> Vec<ExtractedRow> {
  threads.iter()
    .flat_map(|thread| thread.iter())
    .filter_map(extract_row)
    .collect()
}

/// append the extracted rows of `threads` to the csv at `output_file`,
/// creating it (with a header) if it doesn't exist yet. returns the number of
/// rows written
///
/// the exists-then-create check isn't atomic: two processes appending to the
/// same new file can end up with zero or two header lines
pub fn save_extracted_fields_to_csv(threads: &[Thread], output_file: &Path) -> Result<usize> {
  let file_exists = output_file.is_file();
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(output_file)?;
  let mut writer = csv::WriterBuilder::new()
    .has_headers(false)
    .terminator(csv::Terminator::CRLF)
    .from_writer(file);

  // header only on a fresh file
  if !file_exists {
    writer.write_record(HEADER)?;
  }

  let rows = extract_rows(threads);
  for row in &rows {
    writer.write_record([row.extracted_text.as_str(), row.post_link.as_str()])?;
  }
  writer.flush()?;

  debug!(path = %output_file.display(), rows = rows.len(), new_file = !file_exists, "csv appended");
  Ok(rows.len())
}
