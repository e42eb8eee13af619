pub mod answer_submitter;
pub mod retry_policy;

pub use answer_submitter::AnswerSubmitter;
pub use retry_policy::RetryPolicy;
