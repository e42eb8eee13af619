//! 集成测试共用的内存版测试服务

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use impulse_test_client::models::{
    AnswerCode, AvailableDay, BookingResponse, Interview, Question, QuestionId, TestDefinition,
    TimeBlock,
};
use impulse_test_client::{AppError, AppResult, TestService};

pub fn questions(n: i64) -> Vec<Question> {
    (1..=n)
        .map(|id| Question::new(id, format!("Pregunta número {}", id)))
        .collect()
}

pub fn days() -> Vec<AvailableDay> {
    vec![
        AvailableDay {
            fecha: "Lunes|3 de Junio".to_string(),
            bloques: vec![TimeBlock {
                inicio: "2024-06-03 10:00".to_string(),
                fin: "2024-06-03 10:20".to_string(),
            }],
        },
        AvailableDay {
            fecha: "Martes|4 de Junio".to_string(),
            bloques: vec![
                TimeBlock {
                    inicio: "2024-06-04 09:00".to_string(),
                    fin: "2024-06-04 09:20".to_string(),
                },
                TimeBlock {
                    inicio: "2024-06-04 09:20".to_string(),
                    fin: "2024-06-04 09:40".to_string(),
                },
            ],
        },
    ]
}

/// 内存中的测试服务
///
/// `failing_answers` 中的题目提交一律失败；`*_failures` 表示接下来多少次调用失败。
#[derive(Default)]
pub struct FakeService {
    pub questions: Vec<Question>,
    pub load_error: Option<String>,
    pub failing_answers: Mutex<HashSet<QuestionId>>,
    pub start_failures: Mutex<usize>,
    pub finish_failures: Mutex<usize>,
    pub slots_fail: bool,
    pub booking_fail: bool,
    /// 指定题目的提交延迟，用来制造乱序返回
    pub delays: HashMap<QuestionId, Duration>,
    pub saved: Mutex<HashMap<QuestionId, AnswerCode>>,
    pub submit_calls: Mutex<Vec<QuestionId>>,
    pub booked: Mutex<Vec<String>>,
    pub started: Mutex<usize>,
    pub finished: Mutex<usize>,
}

impl FakeService {
    pub fn with_questions(n: i64) -> Self {
        Self {
            questions: questions(n),
            ..Self::default()
        }
    }

    pub fn fail_answer(&self, id: QuestionId) {
        self.failing_answers.lock().unwrap().insert(id);
    }

    pub fn heal_answer(&self, id: QuestionId) {
        self.failing_answers.lock().unwrap().remove(&id);
    }

    pub fn calls_for(&self, id: QuestionId) -> usize {
        self.submit_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|q| **q == id)
            .count()
    }

    fn take_failure(counter: &Mutex<usize>) -> bool {
        let mut remaining = counter.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            true
        } else {
            false
        }
    }
}

fn server_error(endpoint: &str) -> AppError {
    AppError::api_bad_response(endpoint, 500, "Algo salió mal")
}

#[async_trait]
impl TestService for FakeService {
    async fn fetch_test(&self, _codigo: &str) -> AppResult<TestDefinition> {
        match &self.load_error {
            Some(message) => Err(AppError::api_bad_response("tests", 401, message.clone())),
            None => Ok(TestDefinition {
                questions: self.questions.clone(),
            }),
        }
    }

    async fn submit_answer(
        &self,
        _codigo: &str,
        question_id: QuestionId,
        answer: AnswerCode,
    ) -> AppResult<()> {
        self.submit_calls.lock().unwrap().push(question_id);
        if let Some(delay) = self.delays.get(&question_id) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_answers.lock().unwrap().contains(&question_id) {
            return Err(server_error("respuestas-likert-noas"));
        }
        self.saved.lock().unwrap().insert(question_id, answer);
        Ok(())
    }

    async fn start_test(&self, _codigo: &str) -> AppResult<()> {
        *self.started.lock().unwrap() += 1;
        if Self::take_failure(&self.start_failures) {
            return Err(server_error("iniciar"));
        }
        Ok(())
    }

    async fn finish_test(&self, _codigo: &str) -> AppResult<()> {
        *self.finished.lock().unwrap() += 1;
        if Self::take_failure(&self.finish_failures) {
            return Err(server_error("finalizar"));
        }
        Ok(())
    }

    async fn available_slots(&self, _codigo: &str) -> AppResult<Vec<AvailableDay>> {
        if self.slots_fail {
            return Err(server_error("horarios-disponibles"));
        }
        Ok(days())
    }

    async fn book_interview(&self, _codigo: &str, fecha: &str) -> AppResult<BookingResponse> {
        if self.booking_fail {
            return Err(AppError::api_bad_response(
                "crear-entrevista",
                400,
                "El horario ya no está disponible",
            ));
        }
        self.booked.lock().unwrap().push(fecha.to_string());
        Ok(BookingResponse {
            mensaje: "Entrevista creada con éxito".to_string(),
            entrevista: Interview {
                id: 42,
                fecha_inicio: fecha.to_string(),
                fecha_fin: fecha.to_string(),
            },
        })
    }
}
