use std::fmt::Display;

use crate::{Resource, ServiceState};

/// Runs a check closure and funnels every error into a status line plus
/// exit code, so a failed probe still reports a state the scheduler
/// understands instead of dying without one.
pub struct Runner<E> {
    on_error: Option<Box<dyn FnOnce(&E) -> ServiceState>>,
}

impl<E: Display> Runner<E> {
    pub fn new() -> Self {
        Self { on_error: None }
    }

    /// Overrides the state reported for a failed check. The default is
    /// [`ServiceState::Unknown`].
    pub fn on_error(mut self, f: impl FnOnce(&E) -> ServiceState + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn safe_run(self, f: impl FnOnce() -> Result<Resource, E>) -> RunnerResult<E> {
        match f() {
            Ok(resource) => RunnerResult::Ok(resource),
            Err(err) => {
                let state = self
                    .on_error
                    .map(|f| f(&err))
                    .unwrap_or(ServiceState::Unknown);

                RunnerResult::Err(state, err)
            }
        }
    }
}

pub enum RunnerResult<E> {
    Ok(Resource),
    Err(ServiceState, E),
}

impl<E: Display> RunnerResult<E> {
    pub fn print_and_exit(self) -> ! {
        match self {
            RunnerResult::Ok(resource) => resource.print_and_exit(),
            RunnerResult::Err(state, err) => {
                println!("{}: {}", state, err);
                std::process::exit(state.exit_code());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("woops")]
    struct EmptyError;

    #[test]
    fn test_runner_ok() {
        let result = Runner::<EmptyError>::new()
            .on_error(|_| {
                panic!("on_error must not run for a successful check");
            })
            .safe_run(|| Ok(Resource::new("fine")));

        assert!(matches!(result, RunnerResult::Ok(_)));
    }

    #[test]
    fn test_runner_error_defaults_to_unknown() {
        let result = Runner::<EmptyError>::new().safe_run(|| Err(EmptyError {}));

        assert!(matches!(
            result,
            RunnerResult::Err(ServiceState::Unknown, _)
        ));
    }

    #[test]
    fn test_runner_error_state_override() {
        let result = Runner::<EmptyError>::new()
            .on_error(|_| ServiceState::Critical)
            .safe_run(|| Err(EmptyError {}));

        assert!(matches!(
            result,
            RunnerResult::Err(ServiceState::Critical, _)
        ));
    }
}
