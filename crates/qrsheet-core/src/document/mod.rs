//! Sheet model (read-only input document).

mod io;
mod state;

pub use state::Sheet;
