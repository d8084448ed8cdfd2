pub use crate::config::*;

/// A builder that segments a log of vote events into elections.
///
/// Events must be added in log order. Consecutive events with the same target
/// form one election; a target that shows up again after another target starts
/// a new election. Elections are numbered from 1, in log order.
///
/// ```
/// pub use voter_agreement::builder::Builder;
/// pub use voter_agreement::{VoteEvent, VoteValue};
/// # use voter_agreement::DataError;
///
/// let mut builder = Builder::new();
/// for (source, target) in [("Bob", "Anna"), ("Clara", "Anna"), ("Anna", "Bob")] {
///     builder.add_event(VoteEvent {
///         source: Some(source.to_string()),
///         target: target.to_string(),
///         vote: Some(VoteValue::Support),
///         result: true,
///         year: Some(2008),
///         timestamp: None,
///         comment: "".to_string(),
///     })?;
/// }
/// let elections = builder.build();
/// assert_eq!(elections.len(), 2);
/// assert_eq!(elections[0].events.len(), 2);
/// assert_eq!(elections[1].id, 2);
///
/// # Ok::<(), DataError>(())
/// ```
#[derive(Debug, Default)]
pub struct Builder {
    pub(crate) _elections: Vec<Election>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            _elections: Vec::new(),
        }
    }

    /// Appends an event to the log.
    ///
    /// The event joins the current election if it has the same target, otherwise it opens
    /// the next one. Events without a target are rejected.
    pub fn add_event(&mut self, event: VoteEvent) -> Result<(), DataError> {
        if event.target.is_empty() {
            return Err(DataError::EmptyTarget);
        }
        match self._elections.last_mut() {
            Some(current) if current.target == event.target => {
                current.events.push(event);
            }
            _ => {
                let id = self._elections.len() as u32 + 1;
                self._elections.push(Election {
                    id,
                    target: event.target.clone(),
                    result: event.result,
                    events: vec![event],
                });
            }
        }
        Ok(())
    }

    pub fn num_elections(&self) -> usize {
        self._elections.len()
    }

    pub fn build(self) -> Vec<Election> {
        self._elections
    }
}
