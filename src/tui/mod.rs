mod ui;
mod widgets;

use std::io;
use std::time::Duration;

use chrono::Utc;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::catalog::ToolCategory;
use crate::db::Database;
use crate::models::{ToolConfig, Verdict};
use crate::session::Vetting;

// Wizard screens: pick a tool, rate the tests, read the results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Selector,
    Runner,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorStep {
    Category,
    UseCase,
    Name,
}

pub struct StatefulList<T> {
    pub items: Vec<T>,
    pub selected: Option<usize>,
}

impl<T> StatefulList<T> {
    fn with_items(items: Vec<T>) -> Self {
        let selected = if items.is_empty() { None } else { Some(0) };
        Self { items, selected }
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) => {
                if i >= self.items.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.selected = Some(i);
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) => {
                if i == 0 {
                    self.items.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.selected = Some(i);
    }

    fn selected_item(&self) -> Option<&T> {
        self.selected.and_then(|i| self.items.get(i))
    }
}

pub struct App<'a> {
    db: &'a Database,
    pub vetting: &'a mut Vetting,
    pub view: View,
    pub selector_step: SelectorStep,
    pub categories: StatefulList<ToolCategory>,
    pub use_cases: StatefulList<String>,
    pub name_input: String,
    pub notes_input: String,
    pub notes_mode: bool,
    pub current_test: usize,
    pub should_quit: bool,
}

impl<'a> App<'a> {
    pub fn new(db: &'a Database, vetting: &'a mut Vetting) -> Self {
        let categories = StatefulList::with_items(vetting.catalog().tool_categories().to_vec());
        let view = if vetting.is_active() {
            View::Runner
        } else {
            View::Selector
        };
        // Resume where the user left off
        let current_test = vetting
            .session()
            .and_then(|s| {
                s.test_cases.iter().position(|t| {
                    s.results
                        .iter()
                        .find(|r| r.test_id == t.id)
                        .map(|r| !r.is_rated())
                        .unwrap_or(true)
                })
            })
            .unwrap_or(0);

        Self {
            db,
            vetting,
            view,
            selector_step: SelectorStep::Category,
            categories,
            use_cases: StatefulList::with_items(Vec::new()),
            name_input: String::new(),
            notes_input: String::new(),
            notes_mode: false,
            current_test,
            should_quit: false,
        }
    }

    fn persist(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self.vetting.snapshot() {
            Some(session) => self.db.save_session(&session)?,
            None => self.db.clear_session()?,
        }
        Ok(())
    }

    fn test_count(&self) -> usize {
        self.vetting
            .session()
            .map(|s| s.test_cases.len())
            .unwrap_or(0)
    }

    pub fn current_test_id(&self) -> Option<String> {
        self.vetting
            .session()
            .and_then(|s| s.test_cases.get(self.current_test))
            .map(|t| t.id.clone())
    }

    fn pick_category(&mut self) {
        if let Some(category) = self.categories.selected_item() {
            self.use_cases = StatefulList::with_items(category.use_cases.clone());
            self.selector_step = SelectorStep::UseCase;
        }
    }

    fn submit_config(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let category_id = match self.categories.selected_item() {
            Some(c) => c.id.clone(),
            None => return Ok(()),
        };
        let use_case = match self.use_cases.selected_item() {
            Some(u) => u.clone(),
            None => return Ok(()),
        };

        let config = ToolConfig {
            id: Utc::now().timestamp_millis().to_string(),
            name: self.name_input.trim().to_string(),
            category: category_id,
            use_case,
            industry: None,
            expected_users: None,
        };
        if config.validate().is_err() {
            // Incomplete form, stay on it
            return Ok(());
        }

        self.vetting.select_tool(config)?;
        self.persist()?;
        self.current_test = 0;
        self.notes_input.clear();
        self.view = View::Runner;
        Ok(())
    }

    fn record_verdict(&mut self, verdict: Verdict) -> Result<(), Box<dyn std::error::Error>> {
        let Some(test_id) = self.current_test_id() else {
            return Ok(());
        };
        let notes = std::mem::take(&mut self.notes_input);
        let notes = notes.trim();
        self.vetting.record_result(
            &test_id,
            verdict,
            if notes.is_empty() { None } else { Some(notes) },
        );
        self.persist()?;

        // Auto-advance; the last rating lands on the results screen
        if self.current_test + 1 < self.test_count() {
            self.current_test += 1;
        } else {
            self.view = View::Results;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(done) = self.vetting.finalize() {
            self.db.record_assessment(&done)?;
            self.db.clear_session()?;
        }
        self.should_quit = true;
        Ok(())
    }

    fn start_over(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.vetting.reset();
        self.persist()?;
        self.view = View::Selector;
        self.selector_step = SelectorStep::Category;
        self.use_cases = StatefulList::with_items(Vec::new());
        self.name_input.clear();
        self.notes_input.clear();
        self.current_test = 0;
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) -> Result<(), Box<dyn std::error::Error>> {
        // Notes entry on the runner screen
        if self.notes_mode {
            match key {
                KeyCode::Esc => {
                    self.notes_mode = false;
                    self.notes_input.clear();
                }
                KeyCode::Enter => {
                    self.notes_mode = false;
                }
                KeyCode::Backspace => {
                    self.notes_input.pop();
                }
                KeyCode::Char(c) => {
                    self.notes_input.push(c);
                }
                _ => {}
            }
            return Ok(());
        }

        // Tool-name entry on the selector screen
        if self.view == View::Selector && self.selector_step == SelectorStep::Name {
            match key {
                KeyCode::Esc => {
                    self.selector_step = SelectorStep::UseCase;
                }
                KeyCode::Enter => {
                    self.submit_config()?;
                }
                KeyCode::Backspace => {
                    self.name_input.pop();
                }
                KeyCode::Char(c) => {
                    self.name_input.push(c);
                }
                _ => {}
            }
            return Ok(());
        }

        if key == KeyCode::Char('q') {
            self.should_quit = true;
            return Ok(());
        }

        match self.view {
            View::Selector => match (self.selector_step, key) {
                (SelectorStep::Category, KeyCode::Char('j') | KeyCode::Down) => {
                    self.categories.next();
                }
                (SelectorStep::Category, KeyCode::Char('k') | KeyCode::Up) => {
                    self.categories.previous();
                }
                (SelectorStep::Category, KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right) => {
                    self.pick_category();
                }
                (SelectorStep::UseCase, KeyCode::Char('j') | KeyCode::Down) => {
                    self.use_cases.next();
                }
                (SelectorStep::UseCase, KeyCode::Char('k') | KeyCode::Up) => {
                    self.use_cases.previous();
                }
                (SelectorStep::UseCase, KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right) => {
                    if self.use_cases.selected_item().is_some() {
                        self.selector_step = SelectorStep::Name;
                    }
                }
                (SelectorStep::UseCase, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left) => {
                    self.selector_step = SelectorStep::Category;
                }
                _ => {}
            },

            View::Runner => match key {
                KeyCode::Char('p') => self.record_verdict(Verdict::Pass)?,
                KeyCode::Char('x') => self.record_verdict(Verdict::Partial)?,
                KeyCode::Char('f') => self.record_verdict(Verdict::Fail)?,
                KeyCode::Char('n') => {
                    self.notes_mode = true;
                }
                KeyCode::Char('j') | KeyCode::Down | KeyCode::Right | KeyCode::Char('l') => {
                    if self.current_test + 1 < self.test_count() {
                        self.current_test += 1;
                    }
                }
                KeyCode::Char('k') | KeyCode::Up | KeyCode::Left | KeyCode::Char('h') => {
                    self.current_test = self.current_test.saturating_sub(1);
                }
                KeyCode::Char('r') => {
                    self.view = View::Results;
                }
                KeyCode::Char('s') if self.test_count() == 0 => {
                    // Unknown category produced an empty test set
                    self.start_over()?;
                }
                _ => {}
            },

            View::Results => match key {
                KeyCode::Char('b') | KeyCode::Char('h') | KeyCode::Esc | KeyCode::Left => {
                    if self.test_count() > 0 {
                        self.view = View::Runner;
                    }
                }
                KeyCode::Enter => {
                    self.finish()?;
                }
                KeyCode::Char('s') => {
                    self.start_over()?;
                }
                _ => {}
            },
        }
        Ok(())
    }
}

pub fn run(db: &Database, vetting: &mut Vetting) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(db, vetting);

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key.code)?;
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
