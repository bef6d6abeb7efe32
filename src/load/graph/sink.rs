use crate::load::error::LoadError;
use crate::load::graph::script::{CommandScript, ROLLBACK, insert_statement, truncate_class};
use crate::load::traits::{BatchSink, CommandExecutor};
use crate::transform::records::Record;
use log::{error, info, warn};

/// Sends `script` as one transaction. On failure a `ROLLBACK;` follows and the
/// original error is returned; the rollback's own outcome is only logged.
pub fn execute_transactional<E: CommandExecutor + ?Sized>(
    executor: &E,
    target: &str,
    script: &CommandScript,
) -> Result<usize, LoadError> {
    match executor.execute(&script.render(), true) {
        Ok(_) => Ok(script.len()),
        Err(err) => {
            error!("Script for '{target}' failed, rolling back: {err}");
            if let Err(rollback_err) = executor.execute(ROLLBACK, true) {
                warn!("Rollback for '{target}' failed: {rollback_err}");
            }
            Err(err)
        }
    }
}

/// Turns each chunk into `INSERT INTO <class> CONTENT <json>` statements inside one script.
#[derive(Debug)]
pub struct GraphBatchSink<'a, E: ?Sized> {
    executor: &'a E,
}

impl<'a, E: CommandExecutor + ?Sized> GraphBatchSink<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        Self { executor }
    }
}

impl<E: CommandExecutor + ?Sized> BatchSink for GraphBatchSink<'_, E> {
    fn submit(&self, target: &str, chunk: &[Record]) -> Result<usize, LoadError> {
        let mut script = CommandScript::new();
        for record in chunk {
            script.push(insert_statement(target, record)?);
        }
        execute_transactional(self.executor, target, &script)
    }
}

/// Empties a class, ignoring the edges that still point at its vertices.
pub fn clear_class<E: CommandExecutor + ?Sized>(
    executor: &E,
    class: &str,
) -> Result<(), LoadError> {
    executor.execute(&truncate_class(class), false)?;
    info!("Truncated class '{class}'.");
    Ok(())
}
