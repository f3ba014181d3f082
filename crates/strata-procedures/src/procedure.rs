//! Procedure registration and dispatch.
//!
//! The host engine binds procedures to callable names; this module is that
//! binding, reduced to its essentials: a declared argument schema, a handler,
//! and a registry keyed by `{schema}.{name}`. Dispatch validates arguments
//! against the schema and consults access control before the handler runs,
//! so handlers only ever see well-typed argument sets.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use strata_core::error::{Error, Result};
use strata_metastore::AccessControl;

/// Argument types procedures can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    /// A string argument.
    Varchar,
    /// An ordered list of strings.
    VarcharArray,
}

impl fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Varchar => write!(f, "varchar"),
            Self::VarcharArray => write!(f, "array(varchar)"),
        }
    }
}

/// One declared procedure argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    /// Argument name.
    pub name: String,
    /// Argument type.
    pub kind: ArgumentKind,
}

impl Argument {
    /// Creates a new argument declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ArgumentKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A positional argument value supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// A string value.
    Varchar(String),
    /// An ordered list of strings.
    VarcharArray(Vec<String>),
}

impl ArgValue {
    fn kind(&self) -> ArgumentKind {
        match self {
            Self::Varchar(_) => ArgumentKind::Varchar,
            Self::VarcharArray(_) => ArgumentKind::VarcharArray,
        }
    }
}

/// Validated argument set handed to a handler.
#[derive(Debug, Clone)]
pub struct ProcedureArgs {
    named: Vec<(String, ArgValue)>,
}

impl ProcedureArgs {
    /// Returns a varchar argument by name.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the argument is missing or not a
    /// varchar.
    pub fn varchar(&self, name: &str) -> Result<&str> {
        match self.get(name)? {
            ArgValue::Varchar(s) => Ok(s),
            other => Err(Error::invalid_argument(format!(
                "argument {name} has type {}, expected varchar",
                other.kind()
            ))),
        }
    }

    /// Returns a varchar-array argument by name.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the argument is missing or not an
    /// array.
    pub fn varchar_array(&self, name: &str) -> Result<&[String]> {
        match self.get(name)? {
            ArgValue::VarcharArray(items) => Ok(items),
            other => Err(Error::invalid_argument(format!(
                "argument {name} has type {}, expected array(varchar)",
                other.kind()
            ))),
        }
    }

    fn get(&self, name: &str) -> Result<&ArgValue> {
        self.named
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| Error::invalid_argument(format!("missing argument {name}")))
    }
}

/// A procedure implementation.
#[async_trait]
pub trait ProcedureHandler: Send + Sync + 'static {
    /// Runs the procedure with a validated argument set.
    async fn call(&self, args: &ProcedureArgs) -> Result<()>;
}

/// A registered procedure: schema-qualified name, argument schema, handler.
#[derive(Clone)]
pub struct Procedure {
    /// Schema the procedure is registered under (e.g., `system`).
    pub schema: String,
    /// Procedure name.
    pub name: String,
    /// Declared arguments, in positional order.
    pub arguments: Vec<Argument>,
    handler: Arc<dyn ProcedureHandler>,
}

impl Procedure {
    /// Creates a new procedure.
    #[must_use]
    pub fn new(
        schema: impl Into<String>,
        name: impl Into<String>,
        arguments: Vec<Argument>,
        handler: Arc<dyn ProcedureHandler>,
    ) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            arguments,
            handler,
        }
    }

    /// Returns the fully qualified `{schema}.{name}`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Binds positional values against the declared argument schema.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` on arity or type mismatch.
    pub fn bind(&self, values: Vec<ArgValue>) -> Result<ProcedureArgs> {
        if values.len() != self.arguments.len() {
            return Err(Error::invalid_argument(format!(
                "procedure {} takes {} arguments, got {}",
                self.full_name(),
                self.arguments.len(),
                values.len()
            )));
        }

        let named = self
            .arguments
            .iter()
            .zip(values)
            .map(|(declared, value)| {
                if value.kind() != declared.kind {
                    return Err(Error::invalid_argument(format!(
                        "argument {} has type {}, expected {}",
                        declared.name,
                        value.kind(),
                        declared.kind
                    )));
                }
                Ok((declared.name.clone(), value))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ProcedureArgs { named })
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Procedure")
            .field("schema", &self.schema)
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

/// Registry of callable procedures.
pub struct ProcedureRegistry {
    procedures: HashMap<String, Procedure>,
    access_control: Arc<dyn AccessControl>,
}

impl ProcedureRegistry {
    /// Creates an empty registry gated by the given access control.
    #[must_use]
    pub fn new(access_control: Arc<dyn AccessControl>) -> Self {
        Self {
            procedures: HashMap::new(),
            access_control,
        }
    }

    /// Registers a procedure.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the name is already registered.
    pub fn register(&mut self, procedure: Procedure) -> Result<()> {
        let key = procedure.full_name();
        if self.procedures.contains_key(&key) {
            return Err(Error::invalid_argument(format!(
                "procedure {key} is already registered"
            )));
        }
        self.procedures.insert(key, procedure);
        Ok(())
    }

    /// Looks up a procedure by its fully qualified name.
    #[must_use]
    pub fn get(&self, full_name: &str) -> Option<&Procedure> {
        self.procedures.get(full_name)
    }

    /// Dispatches a procedure call on behalf of `user`.
    ///
    /// Argument validation and the access-control check both happen before
    /// the handler runs.
    ///
    /// # Errors
    ///
    /// Returns `Error::ResourceNotFound` for unknown procedures,
    /// `Error::InvalidArgument` for denied or malformed calls, and whatever
    /// the handler itself fails with.
    pub async fn call(&self, user: &str, full_name: &str, values: Vec<ArgValue>) -> Result<()> {
        let procedure = self
            .get(full_name)
            .ok_or_else(|| Error::resource_not_found("procedure", full_name))?;

        self.access_control
            .check_can_execute_procedure(user, full_name)?;
        let args = procedure.bind(values)?;

        tracing::debug!(procedure = full_name, user = user, "dispatching procedure");
        procedure.handler.call(&args).await
    }
}

impl fmt::Debug for ProcedureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureRegistry")
            .field("procedures", &self.procedures.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use strata_metastore::AllowAllAccessControl;

    #[derive(Default)]
    struct CountingHandler {
        calls: AtomicU32,
    }

    #[async_trait]
    impl ProcedureHandler for Arc<CountingHandler> {
        async fn call(&self, _args: &ProcedureArgs) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn test_procedure(handler: Arc<CountingHandler>) -> Procedure {
        Procedure::new(
            "system",
            "touch",
            vec![
                Argument::new("name", ArgumentKind::Varchar),
                Argument::new("tags", ArgumentKind::VarcharArray),
            ],
            Arc::new(handler),
        )
    }

    #[tokio::test]
    async fn test_call_dispatches_with_valid_args() {
        let handler = Arc::new(CountingHandler::default());
        let mut registry = ProcedureRegistry::new(Arc::new(AllowAllAccessControl));
        registry.register(test_procedure(handler.clone())).unwrap();

        registry
            .call(
                "alice",
                "system.touch",
                vec![
                    ArgValue::Varchar("x".to_string()),
                    ArgValue::VarcharArray(vec!["a".to_string()]),
                ],
            )
            .await
            .unwrap();

        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_arity_mismatch_fails_before_handler() {
        let handler = Arc::new(CountingHandler::default());
        let mut registry = ProcedureRegistry::new(Arc::new(AllowAllAccessControl));
        registry.register(test_procedure(handler.clone())).unwrap();

        let result = registry
            .call(
                "alice",
                "system.touch",
                vec![ArgValue::Varchar("x".to_string())],
            )
            .await;

        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_type_mismatch_fails_before_handler() {
        let handler = Arc::new(CountingHandler::default());
        let mut registry = ProcedureRegistry::new(Arc::new(AllowAllAccessControl));
        registry.register(test_procedure(handler.clone())).unwrap();

        let result = registry
            .call(
                "alice",
                "system.touch",
                vec![
                    ArgValue::VarcharArray(vec!["x".to_string()]),
                    ArgValue::VarcharArray(vec![]),
                ],
            )
            .await;

        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_procedure_fails() {
        let registry = ProcedureRegistry::new(Arc::new(AllowAllAccessControl));
        let result = registry.call("alice", "system.nope", Vec::new()).await;
        assert!(matches!(result, Err(Error::ResourceNotFound { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_registration_fails() {
        let handler = Arc::new(CountingHandler::default());
        let mut registry = ProcedureRegistry::new(Arc::new(AllowAllAccessControl));
        registry.register(test_procedure(handler.clone())).unwrap();

        let result = registry.register(test_procedure(handler));
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
    }
}
