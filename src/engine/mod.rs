pub mod director;
pub mod dispatcher;
pub mod engine;
pub mod host;
pub mod interpreter;
pub mod notify;
pub mod protocol;

#[cfg(test)]
pub(crate) mod testing;
