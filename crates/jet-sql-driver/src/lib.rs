//! # jet-sql-driver
//!
//! Builds commands for Microsoft Jet (Access) from statements produced by an
//! ORM query generator. The statement text is rewritten with
//! [`jet_sql_core::Rewriter`] and the parameters re-bound with their
//! declared types before the command is handed to a [`NativeDriver`].
//!
//! ```rust
//! use jet_sql_core::SqlStatement;
//! use jet_sql_driver::{Command, CommandType, DriverConfig, JetDriver, NativeDriver, SqlType};
//!
//! struct Passthrough;
//!
//! impl NativeDriver for Passthrough {
//!     type Command = Command;
//!     type Error = std::convert::Infallible;
//!
//!     fn create_command(&self, command: Command) -> Result<Command, Self::Error> {
//!         Ok(command)
//!     }
//! }
//!
//! let driver = JetDriver::new(Passthrough, &DriverConfig::default());
//! let statement = SqlStatement::parse("select upper(name) from T where id = ?", [1]).unwrap();
//! let command = driver
//!     .generate_command(CommandType::Text, &statement, &[SqlType::Int32])
//!     .unwrap();
//! assert_eq!(command.text, "select ucase(name) from T where id = @p0");
//! assert_eq!(command.parameters[0].name, "p0");
//! ```

mod command;
mod config;
mod driver;
mod error;

pub use command::{BoundParameter, Command, CommandType, SqlType};
pub use config::DriverConfig;
pub use driver::{JetDriver, NativeDriver};
pub use error::{DriverError, Result};
