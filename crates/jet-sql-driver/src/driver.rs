//! The Jet driver: rewrites statements and builds native commands.

use jet_sql_core::{
    Dialect, JetDialect, Limit, Parameter, ParameterStyle, Rewriter, SqlStatement,
};
use tracing::debug;

use crate::command::{BoundParameter, Command, CommandType, SqlType};
use crate::config::DriverConfig;
use crate::error::{DriverError, Result};

/// The native command factory the Jet driver delegates to.
///
/// Implementations wrap whatever actually talks to the database; the Jet
/// driver only decides the command text and parameter list.
pub trait NativeDriver {
    /// The native command type.
    type Command;
    /// The native error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates a native command.
    ///
    /// # Errors
    ///
    /// Returns the native driver's error.
    fn create_command(&self, command: Command) -> std::result::Result<Self::Command, Self::Error>;
}

/// Builds Jet commands on top of a native driver.
#[derive(Debug, Clone)]
pub struct JetDriver<D> {
    native: D,
    rewriter: Rewriter,
    dialect: JetDialect,
    parameter_style: ParameterStyle,
}

impl<D: NativeDriver> JetDriver<D> {
    /// Creates a driver from a configuration.
    pub fn new(native: D, config: &DriverConfig) -> Self {
        Self {
            native,
            rewriter: Rewriter::new(&config.rewrite),
            dialect: JetDialect::with_features(config.dialect),
            parameter_style: config.parameter_style,
        }
    }

    /// Creates a driver around an existing rewriter, sharing its cache.
    pub const fn with_rewriter(
        native: D,
        rewriter: Rewriter,
        dialect: JetDialect,
        parameter_style: ParameterStyle,
    ) -> Self {
        Self {
            native,
            rewriter,
            dialect,
            parameter_style,
        }
    }

    /// Prefix of named parameters in command text.
    #[must_use]
    pub const fn named_prefix(&self) -> &'static str {
        "@"
    }

    /// The rewriter in use.
    #[must_use]
    pub const fn rewriter(&self) -> &Rewriter {
        &self.rewriter
    }

    /// The dialect in use.
    #[must_use]
    pub const fn dialect(&self) -> &JetDialect {
        &self.dialect
    }

    /// The wrapped native driver.
    #[must_use]
    pub const fn native(&self) -> &D {
        &self.native
    }

    /// Generates a native command for a statement.
    ///
    /// Text commands are rewritten for Jet first; stored procedures pass
    /// through. `parameter_types[n]` is the declared type of the parameter
    /// with ordinal `n`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Rewrite`] if the statement cannot be
    /// rewritten, [`DriverError::MissingParameterType`] if a parameter has
    /// no declared type, and [`DriverError::Native`] if the native driver
    /// refuses the command.
    pub fn generate_command(
        &self,
        command_type: CommandType,
        statement: &SqlStatement,
        parameter_types: &[SqlType],
    ) -> Result<D::Command> {
        let (text, parameters) = match command_type {
            CommandType::Text => {
                let (rewritten, parameters) = self.rewriter.rewrite(statement)?;
                (rewritten.render(self.parameter_style), parameters)
            }
            CommandType::StoredProcedure => {
                let parameters: Vec<Parameter> = statement.parameters().cloned().collect();
                (statement.render(self.parameter_style), parameters)
            }
        };

        let parameters = parameters
            .into_iter()
            .enumerate()
            .map(|(index, parameter)| bind(index, parameter, parameter_types))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            command_type = ?command_type,
            sql = %text,
            parameters = parameters.len(),
            "Generating command"
        );

        let command = Command {
            command_type,
            text,
            parameters,
        };
        self.native
            .create_command(command)
            .map_err(|e| DriverError::Native(Box::new(e)))
    }

    /// Adds a row limit to a statement.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Rewrite`] with an unsupported-clause error when
    /// Jet cannot express the limit.
    pub fn limit(
        &self,
        statement: &SqlStatement,
        offset: u64,
        limit: &Limit,
    ) -> Result<SqlStatement> {
        Ok(self.dialect.apply_limit(statement, offset, limit)?)
    }

    /// Quotes an identifier for Jet if it is a reserved word.
    #[must_use]
    pub fn quote_if_reserved(&self, name: &str) -> String {
        self.dialect.quote_if_reserved(name)
    }
}

fn bind(index: usize, parameter: Parameter, parameter_types: &[SqlType]) -> Result<BoundParameter> {
    let ordinal = parameter.position.unwrap_or(index);
    let sql_type = *parameter_types
        .get(ordinal)
        .ok_or(DriverError::MissingParameterType {
            ordinal,
            declared: parameter_types.len(),
        })?;
    Ok(BoundParameter {
        name: format!("p{ordinal}"),
        sql_type,
        value: parameter.value,
    })
}
