//! CLI command implementations
//!
//! Every command returns its process exit code:
//!
//! | code | meaning |
//! |------|---------|
//! | 0 | success |
//! | 1 | some collections failed or the run was interrupted |
//! | 2 | configuration error |
//! | 5 | fatal error, including a failed vendor handshake |

pub mod collections;
pub mod init;
pub mod sync;
pub mod validate;
