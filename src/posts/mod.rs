pub mod links;
pub mod thread;
pub mod uri;
