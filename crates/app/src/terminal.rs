//! Line-oriented terminal front end over the quiz services.

use std::fmt::Write as _;

use log::warn;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

use quiz_core::model::{ChapterSelector, QuestionKind};
use services::session::option_index;
use services::{QuestionView, QuizServices, QuizSession, SessionError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pick(Vec<usize>),
    Submit,
    Next,
    Previous,
    Remove,
    Chapters,
    Chapter(String),
    Logout,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (head, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(h, r)| (h, r.trim()));

        match head.to_ascii_lowercase().as_str() {
            "submit" => Command::Submit,
            "next" => Command::Next,
            "prev" | "previous" => Command::Previous,
            "remove" => Command::Remove,
            "chapters" => Command::Chapters,
            "chapter" if !rest.is_empty() => Command::Chapter(rest.to_owned()),
            "chapter" => Command::Unknown(line.to_owned()),
            "logout" => Command::Logout,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => parse_picks(line).map_or_else(|| Command::Unknown(line.to_owned()), Command::Pick),
        }
    }
}

/// `"a c"`, `"AC"` and `"a,c"` all pick options 0 and 2.
fn parse_picks(line: &str) -> Option<Vec<usize>> {
    let letters: Vec<char> = line
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    if letters.is_empty() {
        return None;
    }
    letters.into_iter().map(option_index).collect()
}

const HELP: &str = "\
Commands:
  <letters>         toggle options, e.g. `a` or `a c`
  submit            grade the current answer
  next / prev       move through the current chapter
  remove            drop a correctly answered question from review
  chapters          list chapters with scores
  chapter <n|name>  switch chapter by number or name
  logout            forget the activation code
  quit";

pub fn render_chapters(session: &QuizSession) -> String {
    let mut out = String::new();
    for (i, entry) in session.chapter_entries().iter().enumerate() {
        let marker = if entry.active { '*' } else { ' ' };
        let _ = write!(out, "{marker}{}. {}", i + 1, entry.selector);
        if let Some(score) = entry.score {
            let _ = write!(out, " ({score})");
        }
        out.push('\n');
    }
    let _ = write!(out, "Total: {} (correct / answered)", session.total_score());
    out
}

pub fn render_question(view: &QuestionView) -> String {
    let mut out = String::new();
    let badge = match view.kind {
        QuestionKind::Multi => " [multi]",
        QuestionKind::TrueFalse => " [true/false]",
        QuestionKind::Single => "",
    };
    let _ = writeln!(out, "{}/{}. {}{badge}", view.position, view.pool_size, view.prompt);

    for option in &view.options {
        let picked = if option.picked { '>' } else { ' ' };
        let correct = if option.correct { " ✓" } else { "" };
        let _ = writeln!(out, " {picked} {}. {}{correct}", option.letter, option.text);
    }

    if let Some(reveal) = &view.reveal {
        let verdict = if reveal.correct { "Correct!" } else { "Wrong." };
        let letters: Vec<String> = reveal.correct_letters.iter().map(char::to_string).collect();
        let _ = writeln!(out, "{verdict} Answer: {}", letters.join(", "));
        if let Some(note) = &reveal.note {
            let _ = writeln!(out, "Note: {note}");
        }
        if view.can_remove_from_review {
            let _ = writeln!(out, "(type `remove` to drop it from review)");
        }
    }
    out
}

fn resolve_chapter(session: &QuizSession, arg: &str) -> ChapterSelector {
    let chapters = session.chapters();
    arg.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| chapters.get(i).cloned())
        .unwrap_or_else(|| ChapterSelector::from_label(arg))
}

pub struct Terminal {
    services: QuizServices,
    lines: tokio::io::Lines<BufReader<Stdin>>,
}

enum Flow {
    Logout,
    Quit,
}

impl Terminal {
    pub fn new(services: QuizServices) -> Self {
        Self {
            services,
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        println!("{prompt}");
        self.lines.next_line().await
    }

    /// Runs until the user quits or stdin closes.
    pub async fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            let Some(start) = self.services.enter().await? else {
                if !self.activate().await? {
                    return Ok(());
                }
                continue;
            };

            if !start.report.failed_sources.is_empty() {
                println!(
                    "Some question sources could not be loaded: {}",
                    start.report.failed_sources.join(", ")
                );
            }
            match self.play(start.session).await? {
                Flow::Logout => {
                    self.services.access().deactivate().await?;
                }
                Flow::Quit => return Ok(()),
            }
        }
    }

    /// Prompts for a code until one is accepted; `false` if the user gave up.
    async fn activate(&mut self) -> Result<bool, Box<dyn std::error::Error>> {
        loop {
            let Some(line) = self.read_line("Enter activation code (or `quit`):").await? else {
                return Ok(false);
            };
            if matches!(Command::parse(&line), Command::Quit) {
                return Ok(false);
            }
            match self.services.access().activate(&line).await {
                Ok(_) => return Ok(true),
                Err(services::AccessGateError::Access(err)) => println!("{err}, please try again."),
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn play(&mut self, mut session: QuizSession) -> Result<Flow, Box<dyn std::error::Error>> {
        let session_loop = self.services.session_loop();
        println!("{}", render_chapters(&session));
        loop {
            match session.question_view() {
                Some(view) => print!("{}", render_question(&view)),
                None => println!("No questions in this chapter."),
            }

            let Some(line) = self.read_line(">").await? else {
                return Ok(Flow::Quit);
            };

            match Command::parse(&line) {
                Command::Pick(options) => {
                    for option in options {
                        session.toggle_pick(option);
                    }
                }
                Command::Submit => {
                    if session_loop.submit(&mut session).await?.is_none() {
                        println!("Pick at least one option first.");
                    }
                }
                Command::Next => {
                    session.next();
                }
                Command::Previous => {
                    session.previous();
                }
                Command::Remove => match session_loop.remove_from_review(&mut session).await {
                    Ok(removed) => println!("Removed {} from review.", removed.id()),
                    Err(SessionError::RemovalNotAllowed) => {
                        println!("Only a correctly answered review question can be removed.");
                    }
                    Err(err) => return Err(err.into()),
                },
                Command::Chapters => println!("{}", render_chapters(&session)),
                Command::Chapter(arg) => {
                    let selector = resolve_chapter(&session, &arg);
                    if let Err(err) = session.select_chapter(selector) {
                        warn!("{err}");
                        println!("{err}");
                    }
                }
                Command::Logout => return Ok(Flow::Logout),
                Command::Help => println!("{HELP}"),
                Command::Quit => return Ok(Flow::Quit),
                Command::Unknown(raw) => println!("Unknown command `{raw}`, type `help`."),
            }
        }
    }
}
