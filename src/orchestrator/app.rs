use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::Browser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::browser;
use crate::clients::{csrf, TestApiClient};
use crate::config::Config;
use crate::error::{AppError, FlowError};
use crate::infrastructure::{BrowserViewport, JsExecutor, PageLayout, SimulatedViewport, Viewport};
use crate::orchestrator::command::{Command, HELP_TEXT};
use crate::tracker::CompletionStatus;
use crate::utils::logging::{append_log_line, init_log_file, log_startup, print_session_stats, truncate_text};
use crate::workflow::{Phase, QuestionsSession, SessionUpdate, TestFlow};

/// 浏览器模式下同步滚动位置的间隔
const SCROLL_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 应用主结构
pub struct App {
    config: Config,
    flow: TestFlow,
    viewport: Arc<dyn Viewport>,
    simulated: Option<Arc<SimulatedViewport>>,
    _browser: Option<Browser>,
}

impl App {
    /// 初始化应用：日志、API 客户端、（可选）浏览器，并加载题目
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate().context("配置无效")?;

        init_log_file(&config.output_log_file, &config.codigo)?;
        log_startup(&config);

        let mut client = TestApiClient::new(&config)?;

        let (browser, executor) = match config.browser_debug_port {
            Some(port) => {
                let (browser, page) = browser::connect_to_browser_and_page(port, &config.target_url)
                    .await
                    .with_context(|| format!("无法连接到调试端口 {}", port))?;
                let executor = Arc::new(JsExecutor::new(page));

                match executor.document_cookie().await {
                    Ok(cookie) => {
                        if let Some(token) = csrf::token_from_cookie(&cookie) {
                            info!("✓ 已从页面读取 csrftoken");
                            client = client.with_csrf_token(Some(token));
                        }
                    }
                    Err(e) => warn!("⚠️ 读取页面 Cookie 失败: {}", e),
                }
                (Some(browser), Some(executor))
            }
            None => (None, None),
        };

        let mut flow = TestFlow::new(
            Arc::new(client),
            config.codigo.clone(),
            config.retry_policy(),
            config.auto_scroll,
        );
        if let Err(e) = flow.load().await {
            error!("❌ 无法加载测试: {}", e);
        }

        let mut simulated = None;
        let viewport: Arc<dyn Viewport> = match executor {
            Some(executor) => match &config.question_list_selector {
                Some(selector) => Arc::new(BrowserViewport::with_selector(executor, selector.as_str())),
                None => Arc::new(BrowserViewport::new(executor)),
            },
            None => {
                let layout = SimulatedViewport::new(PageLayout::default(), flow.questions().len());
                let layout = Arc::new(layout);
                simulated = Some(layout.clone());
                layout
            }
        };

        Ok(Self {
            config,
            flow,
            viewport,
            simulated,
            _browser: browser,
        })
    }

    /// 运行终端交互循环，直到退出或流程结束
    pub async fn run(mut self) -> Result<()> {
        render(&self.flow);
        println!("\n输入 help 查看命令");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut ticker = interval(SCROLL_POLL_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let poll_scroll = self.simulated.is_none();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("读取终端输入失败")? else {
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match line.parse::<Command>() {
                        Ok(Command::Quit) => break,
                        Ok(command) => {
                            if let Err(e) = self.handle(command).await {
                                println!("⚠️ {}", e);
                            }
                        }
                        Err(e) => println!("⚠️ {}（输入 help 查看命令）", e),
                    }
                }
                Some(update) = next_update(&mut self.flow) => {
                    self.on_update(update);
                }
                _ = ticker.tick(), if poll_scroll && self.flow.phase() == &Phase::Questions => {
                    if let Some(session) = self.flow.session_mut() {
                        if let Err(e) = session.on_scroll().await {
                            warn!("⚠️ 同步滚动位置失败: {}", e);
                        }
                    }
                }
            }

            if self.flow.phase() == &Phase::Closed {
                break;
            }
        }

        if let Some(session) = self.flow.session() {
            print_session_stats(session.tracker(), &self.config.output_log_file);
        }
        Ok(())
    }

    async fn handle(&mut self, command: Command) -> Result<(), AppError> {
        match command {
            Command::Help => println!("{}", HELP_TEXT),
            Command::Show => {}
            Command::AcceptTerms(accepted) => self.flow.set_terms_accepted(accepted),
            Command::Start => {
                self.flow.start(self.viewport.clone()).await?;
                self.log_event("测试开始");
            }
            Command::Answer { index, answer } => {
                let question_id = self
                    .flow
                    .questions()
                    .get(index)
                    .map(|q| q.id)
                    .ok_or_else(|| AppError::Other(format!("没有第 {} 题", index + 1)))?;
                self.session_mut()?.record_answer(question_id, answer).await?;
                self.log_event(&format!("题目 {} 作答 {}", question_id, answer));
            }
            Command::AutoScroll(enabled) => self.session_mut()?.set_auto_scroll(enabled),
            Command::Click(index) => {
                self.session_mut()?.click_question(index).await?;
            }
            Command::Scroll(target) => {
                if let (Some(y), Some(simulated)) = (target, &self.simulated) {
                    simulated.set_scroll(y);
                }
                self.session_mut()?.on_scroll().await?;
            }
            Command::Retry => {
                let count = self.session_mut()?.retry_all();
                if count == 0 {
                    println!("没有需要重新提交的答案");
                }
            }
            Command::Wait => {
                let updates = self.session_mut()?.wait_idle().await;
                for update in updates {
                    self.on_update(update);
                }
            }
            Command::Finish => {
                self.flow.finish().await?;
                self.log_event("测试结束");
                self.flow.load_slots().await?;
            }
            Command::NextDay => {
                self.flow.scheduler_mut().next_day();
            }
            Command::PrevDay => {
                self.flow.scheduler_mut().prev_day();
            }
            Command::Pick(index) => {
                if !self.flow.scheduler_mut().select(index) {
                    return Err(AppError::Other(format!("当天没有第 {} 个时段", index + 1)));
                }
            }
            Command::Book => {
                let interview = self.flow.book_interview().await?;
                self.log_event(&format!("面谈已预约: {}", interview.fecha_inicio));
            }
            Command::Close => self.flow.close(),
            Command::Quit => {}
        }

        render(&self.flow);
        Ok(())
    }

    fn on_update(&mut self, update: SessionUpdate) {
        if !update.applied {
            return;
        }
        self.log_event(&format!("题目 {} 提交结果: {}", update.question_id, update.state));
        if update.completed {
            self.log_event("全部答案已保存");
        }
        render(&self.flow);
    }

    fn session_mut(&mut self) -> Result<&mut QuestionsSession, AppError> {
        let phase = self.flow.phase().to_string();
        self.flow.session_mut().ok_or(AppError::Flow(FlowError::WrongPhase {
            action: "questions",
            phase,
        }))
    }

    fn log_event(&self, line: &str) {
        if let Err(e) = append_log_line(&self.config.output_log_file, line) {
            warn!("⚠️ {}", e);
        }
    }
}

/// 下一条提交结果；没有进行中的提交时永远挂起
async fn next_update(flow: &mut TestFlow) -> Option<SessionUpdate> {
    match flow.session_mut() {
        Some(session) if session.has_pending() => session.next_result().await,
        _ => futures::future::pending().await,
    }
}

// ========== 画面输出 ==========

fn render(flow: &TestFlow) {
    println!("\n{}", "─".repeat(60));
    if flow.shows_logo() {
        println!("              ◆ el psicólogo ◆\n");
    }

    match flow.phase() {
        Phase::Loading => println!("Cargando..."),
        Phase::LoadFailed { message } => println!("Error: {}", message),
        Phase::Intro => render_intro(flow),
        Phase::Questions => render_questions(flow),
        Phase::Scheduling => render_scheduler(flow),
        Phase::Scheduled => {
            println!("Tu entrevista ha sido agendada con éxito.");
            if let Some(interview) = flow.interview() {
                println!("  {} → {}", interview.fecha_inicio, interview.fecha_fin);
            }
            println!("(cerrar para terminar)");
        }
        Phase::Closed => {
            println!("Ya puedes cerrar tu navegador manualmente, nosotros lo intentamos pero no se pudo.")
        }
    }
}

fn render_intro(flow: &TestFlow) {
    println!("Test de control de los impulsos\n");
    println!("Hola!");
    println!("Bienvenido(a) a esta evaluación online.");
    println!("A continuación leerás una serie de oraciones con alternativas de respuesta.");
    println!("En cada caso selecciona aquella que más te represente, sin pensarlo demasiado.\n");
    println!(
        "[{}] Acepto los términos y condiciones",
        if flow.terms_accepted() { "x" } else { " " }
    );
    println!(
        "[Comenzar test]{}",
        if flow.can_start() { "" } else { " (deshabilitado)" }
    );
    if let Some(banner) = flow.start_banner() {
        println!("Error: {}", banner);
    }
}

fn render_questions(flow: &TestFlow) {
    let Some(session) = flow.session() else {
        return;
    };

    for view in session.question_views() {
        let marker = if view.focused { "▶" } else { " " };
        let answer = view.answer.map_or("-".to_string(), |a| a.label().to_string());
        let lock = if view.enabled { "" } else { " 🔒" };
        println!(
            "{} {:>2}. {} [{}] ({}){}",
            marker,
            view.index + 1,
            truncate_text(&view.question.text, 48),
            answer,
            view.state,
            lock
        );
    }

    println!(
        "\nAuto-scroll: {}",
        if session.auto_scroll() { "on" } else { "off" }
    );
    match session.completion() {
        CompletionStatus::InProgress => {}
        CompletionStatus::Saving => println!("Guardando respuestas..."),
        CompletionStatus::NeedsRetry => {
            if session.retrying() {
                println!("Reintentando...");
            } else {
                println!("Algunas respuestas no se guardaron. [Reintentar]");
            }
        }
        CompletionStatus::Complete => println!("¡Listo! [Finalizar]"),
    }
    if let Some(banner) = flow.finish_banner() {
        println!("Error: {}", banner);
    }
}

fn render_scheduler(flow: &TestFlow) {
    let scheduler = flow.scheduler();
    let (day, date) = scheduler.heading();
    println!(
        "{} {}  {}  {}",
        if scheduler.has_prev() { "<" } else { " " },
        day,
        date,
        if scheduler.has_next() { ">" } else { " " }
    );
    println!("Entrevista de {} minutos.", scheduler.interview_minutes());
    if let Some(current) = scheduler.current_day() {
        for (index, block) in current.bloques.iter().enumerate() {
            let mark = if scheduler.is_selected(index) { "*" } else { " " };
            println!("  {}{}. {}", mark, index + 1, block.hour());
        }
    }
    println!(
        "[Agendar!]{}",
        if scheduler.can_submit() { "" } else { " (deshabilitado)" }
    );
    if let Some(notice) = scheduler.notice() {
        println!("⚠️ {}", notice);
    }
}
