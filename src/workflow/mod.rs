pub mod questions_session;
pub mod scheduler;
pub mod test_flow;

pub use questions_session::{QuestionView, QuestionsSession, SessionUpdate};
pub use scheduler::InterviewScheduler;
pub use test_flow::{Phase, TestFlow};
