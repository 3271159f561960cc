//! Per-call context threaded through every provider operation.

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, error::UpstreamError};

/// Caller-supplied context for a single login attempt.
///
/// Dropping the future returned by a provider operation cancels it outright. A deadline
/// additionally bounds how long a network call may take: once it has passed, operations fail
/// with [`UpstreamError::Cancelled`] instead of waiting on the provider.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
	/// Absolute point in time after which network calls are abandoned.
	pub deadline: Option<OffsetDateTime>,
}
impl RequestContext {
	/// Context without a deadline.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets an absolute deadline.
	pub fn with_deadline(mut self, deadline: OffsetDateTime) -> Self {
		self.deadline = Some(deadline);

		self
	}

	/// Sets a deadline relative to now.
	///
	/// A timeout too large to represent leaves the context without a deadline; a negative one
	/// too large to represent sets a deadline that has already passed.
	pub fn with_timeout(self, timeout: Duration) -> Self {
		let now = OffsetDateTime::now_utc();

		match now.checked_add(timeout) {
			Some(deadline) => self.with_deadline(deadline),
			None if timeout.is_negative() => self.with_deadline(now),
			None => self,
		}
	}

	/// Time left before the deadline, as a transport timeout.
	///
	/// Returns `Ok(None)` without a deadline and [`UpstreamError::Cancelled`] once the deadline
	/// has passed.
	pub fn remaining(&self) -> Result<Option<StdDuration>, UpstreamError> {
		let Some(deadline) = self.deadline else {
			return Ok(None);
		};
		let left = deadline - OffsetDateTime::now_utc();

		if !left.is_positive() {
			return Err(UpstreamError::Cancelled { source: None });
		}

		StdDuration::try_from(left)
			.map(Some)
			.map_err(|_| UpstreamError::Cancelled { source: None })
	}
}
