mod server;
mod shutdown;

pub use server::Server;
pub use shutdown::{wait_for_signal, Signal};
