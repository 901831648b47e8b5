pub mod google_cse;

pub use google_cse::{GoogleCseExecutor, GoogleCseOptions};
