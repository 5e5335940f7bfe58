//! Line-oriented front end over [`Session`].

use thiserror::Error;

use crate::analytics::Scoreboard;
use crate::chart;
use crate::quiz::labels::{
    case_type_label, direction_label, ema_stack_label, fmt, move_label, timeframe_label,
    trade_direction_label,
};
use crate::quiz::{Direction, MoveBucket, Question, UserInput, UserResponse};
use crate::session::{Overlay, Session};

pub const HELP: &str = "\
commands:
  next | n                          next question
  prev | p                          previous question
  goto <number>                     jump to question (1-based)
  grade <long|short> <weak|mid|strong> [stop]
  reveal [<long|short> <weak|mid|strong> [stop]]
  tf <timeframe>                    switch chart timeframe
  toggle <ema|bb|structure>         show/hide an overlay group
  show                              question, score and answer panel
  chart                             projected chart data as JSON
  list                              question list with scores
  stats                             graded count and average
  help
  quit | q";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Next,
    Prev,
    Goto(usize),
    Grade(UserInput),
    Reveal(UserInput),
    Timeframe(String),
    Toggle(Overlay),
    Show,
    Chart,
    List,
    Stats,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("{0}")]
    Invalid(String),
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = words.split_first() else {
        return Err(CommandError::Empty);
    };

    match head.to_ascii_lowercase().as_str() {
        "next" | "n" => Ok(Command::Next),
        "prev" | "p" => Ok(Command::Prev),
        "goto" | "g" => {
            let n: usize = args
                .first()
                .and_then(|a| a.parse().ok())
                .filter(|n| *n >= 1)
                .ok_or(CommandError::Usage("goto <number>"))?;
            Ok(Command::Goto(n - 1))
        }
        "grade" => parse_input(args)
            .map(Command::Grade)
            .map_err(|e| usage_on_empty(e, "grade <long|short> <weak|mid|strong> [stop]")),
        "reveal" | "r" => {
            if args.is_empty() {
                Ok(Command::Reveal(UserInput::default()))
            } else {
                parse_input(args)
                    .map(Command::Reveal)
                    .map_err(|e| usage_on_empty(e, "reveal [<long|short> <weak|mid|strong> [stop]]"))
            }
        }
        "tf" => args
            .first()
            .map(|tf| Command::Timeframe(tf.to_string()))
            .ok_or(CommandError::Usage("tf <timeframe>")),
        "toggle" => match args.first().map(|a| a.to_ascii_lowercase()).as_deref() {
            Some("ema") => Ok(Command::Toggle(Overlay::Ema)),
            Some("bb") => Ok(Command::Toggle(Overlay::Bollinger)),
            Some("structure") => Ok(Command::Toggle(Overlay::Structure)),
            _ => Err(CommandError::Usage("toggle <ema|bb|structure>")),
        },
        "show" => Ok(Command::Show),
        "chart" => Ok(Command::Chart),
        "list" | "ls" => Ok(Command::List),
        "stats" => Ok(Command::Stats),
        "help" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// `<direction> <move> [stop]`. An unparsable stop counts as no stop.
fn parse_input(args: &[&str]) -> Result<UserInput, CommandError> {
    let (direction, bucket) = match args {
        [d, m, ..] => (d, m),
        _ => return Err(CommandError::Empty),
    };
    let direction: Direction = direction.parse().map_err(CommandError::Invalid)?;
    let bucket: MoveBucket = bucket.parse().map_err(CommandError::Invalid)?;
    let stop = args.get(2).and_then(|raw| parse_stop(raw));
    Ok(UserInput::new(direction, bucket, stop))
}

fn usage_on_empty(err: CommandError, usage: &'static str) -> CommandError {
    match err {
        CommandError::Empty => CommandError::Usage(usage),
        other => other,
    }
}

pub fn parse_stop(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|s| s.is_finite())
}

/// Run one command against the session and return the text to print.
pub fn execute(session: &mut Session, command: Command) -> anyhow::Result<String> {
    let out = match command {
        Command::Next => {
            if !session.next() {
                return Ok("already at the last question".to_string());
            }
            render_question(session)
        }
        Command::Prev => {
            if !session.prev() {
                return Ok("already at the first question".to_string());
            }
            render_question(session)
        }
        Command::Goto(index) => {
            session.select(index)?;
            render_question(session)
        }
        Command::Grade(input) => {
            session.grade_current(&input)?;
            render_question(session)
        }
        Command::Reveal(input) => {
            session.reveal_current(&input)?;
            render_question(session)
        }
        Command::Timeframe(tf) => {
            session.set_timeframe(&tf)?;
            format!("timeframe: {}", timeframe_label(&tf))
        }
        Command::Toggle(overlay) => {
            let on = session.toggle_overlay(overlay);
            format!("{:?}: {}", overlay, if on { "on" } else { "off" })
        }
        Command::Show => render_question(session),
        Command::Chart => match session.current_view() {
            Some(view) if view.has_data() => serde_json::to_string_pretty(&view)?,
            Some(view) => format!("no chart data for {}", timeframe_label(&view.timeframe)),
            None => "no chart data".to_string(),
        },
        Command::List => render_question_list(&session.scoreboard()),
        Command::Stats => render_stats(&session.scoreboard()),
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    };
    Ok(out)
}

pub fn render_question(session: &Session) -> String {
    let state = session.state();
    let Some(question) = session.current() else {
        return format!("No questions loaded (data file: {})", state.dataset_file);
    };
    let response = session.current_response();
    let tf = chart::resolve_timeframe(question, &state.active_tf);
    let available: Vec<String> = session
        .available_timeframes()
        .iter()
        .map(|t| timeframe_label(t))
        .collect();

    let mut lines = vec![
        format!(
            "[{}/{}] {} {} {} {} | {}",
            state.current_index + 1,
            session.questions().len(),
            question.id,
            question.symbol,
            question.timeframe,
            case_type_label(question.case_type.as_deref()),
            timeframe_label(&tf)
        ),
        format!(
            "Entry {} | UTC {} | Regime {} | Session {} | Entry price {} | Timeframes {}",
            question.entry_time_kst.as_deref().unwrap_or("-"),
            question.entry_time_utc.as_deref().unwrap_or("-"),
            question.regime.as_deref().unwrap_or("-"),
            question.session.as_deref().unwrap_or("-"),
            fmt(question.entry_price, 4),
            available.join(" / ")
        ),
        format!(
            "Status: {}",
            if session.is_revealed() { "answer revealed" } else { "hidden" }
        ),
    ];

    if let Some(mindset) = &question.mindset {
        lines.push(String::new());
        lines.push(format!("Mindset: {}", mindset));
    }
    push_list(&mut lines, "Hints", &question.hints);
    push_list(&mut lines, "Decision basis", &question.decision_basis);

    let s = &question.indicator_snapshot;
    lines.push(String::new());
    lines.push("Snapshot".to_string());
    for (key, value) in [
        ("EMA stack", ema_stack_label(s.ema_stack.as_deref())),
        ("RSI14", fmt(s.rsi14, 2)),
        ("ATR14%", fmt(s.atr14_pct, 3)),
        ("Volume ratio20", fmt(s.vol_ratio20, 2)),
        ("Range expansion", fmt(s.range_expansion, 2)),
        ("Trap score", fmt(s.trap_score, 1)),
    ] {
        lines.push(format!("  {:<16} {}", key, value));
    }

    let b = response.map(|r| r.breakdown).unwrap_or_default();
    lines.push(String::new());
    lines.push(format!(
        "Score: direction {} | move {} | stop {} | total {} / 100",
        b.direction, b.move_score, b.stop, b.total
    ));
    lines.push(String::new());
    lines.push(render_answer_panel(question, response));
    lines.join("\n")
}

pub fn render_answer_panel(question: &Question, response: Option<&UserResponse>) -> String {
    let Some(response) = response else {
        return "Grade this question first.".to_string();
    };
    if !response.revealed {
        return format!(
            "Current score: {} / 100. Reveal to show targets (T1/T2), stop and flip price on the chart.",
            response.breakdown.total
        );
    }

    let a = &question.answer;
    let mut lines = vec![
        format!(
            "Answer: {} / expected move {} / realized move {}%",
            direction_label(Some(a.direction)),
            move_label(Some(a.move_bucket)),
            fmt(a.move_pct, 3)
        ),
        format!(
            "Recommended stop {} ({}%) | flip price {}",
            fmt(a.recommended_stop_price, 4),
            fmt(a.recommended_stop_pct, 3),
            fmt(a.flip_price, 4)
        ),
        format!(
            "Target 1 {} | Target 2 {} | adverse excursion {}%",
            fmt(a.target_1_price, 4),
            fmt(a.target_2_price, 4),
            fmt(a.adverse_pct, 3)
        ),
    ];
    if let Some(bt) = &question.backtest_ref {
        lines.push(format!(
            "Backtest: {} / pnl {} / bars held {} / exit {}",
            trade_direction_label(bt.trade_direction.as_deref()),
            fmt(bt.trade_pnl, 4),
            bt.bars_held.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
            bt.exit_reason.as_deref().unwrap_or("-")
        ));
    }
    lines.join("\n")
}

pub fn render_question_list(board: &Scoreboard) -> String {
    board
        .entries
        .iter()
        .map(|entry| {
            format!(
                "{} {:>3}. {} {:<12} {}{}",
                if entry.current { ">" } else { " " },
                entry.index + 1,
                entry.id,
                entry.symbol,
                entry
                    .score
                    .map(|s| format!("{} pts", s))
                    .unwrap_or_else(|| "-".to_string()),
                if entry.revealed { " (revealed)" } else { "" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_stats(board: &Scoreboard) -> String {
    format!(
        "questions {} | graded {} | revealed {} | average {}",
        board.question_count,
        board.graded,
        board.revealed,
        fmt(board.average_total, 1)
    )
}

fn push_list(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(title.to_string());
    lines.extend(items.iter().map(|item| format!("  - {}", item)));
}
