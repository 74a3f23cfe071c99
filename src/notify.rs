use crate::model::ContactSubmission;

/// Failure from the outbound notification channel.
///
/// Callers are expected to log and swallow this: a failed notification
/// must never fail the request that triggered it.
#[derive(Debug, thiserror::Error)]
#[error("notification failed: {0}")]
pub struct Error(pub String);

/// Outbound notification seam for new contact submissions.
///
/// Actual delivery (email or otherwise) lives outside this crate; the
/// routes only depend on this trait and the swallow contract above.
#[axum::async_trait]
pub trait Notifier: Send + Sync {
	async fn contact_submitted(&self, submission: &ContactSubmission) -> Result<(), Error>;
}

/// Notifier that records submissions in the application log.
pub struct LogNotifier;

#[axum::async_trait]
impl Notifier for LogNotifier {
	async fn contact_submitted(&self, submission: &ContactSubmission) -> Result<(), Error> {
		tracing::info!(
			name = %submission.name,
			email = %submission.email,
			subject = %submission.subject,
			"new contact submission"
		);

		Ok(())
	}
}
