pub mod answer;
pub mod question;
pub mod schedule;
pub mod submission;

pub use answer::{AnswerCode, UnknownAnswerCode};
pub use question::{Question, QuestionId, TestDefinition};
pub use schedule::{AvailabilityResponse, AvailableDay, BookingRequest, BookingResponse, Interview, TimeBlock};
pub use submission::{SubmissionState, SubmitOutcome, SubmitRequest, SubmitResult};
