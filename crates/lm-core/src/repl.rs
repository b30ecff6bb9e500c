//! Interactive line-oriented frontend.
//!
//! Prompts for both people, then loops over a numbered menu. All state
//! lives in the [`Session`]; this module only reads lines and renders.

use std::io::{self, BufRead, Write};

use lm_protocol::{Field, Party, ValidationError, ZodiacSign};
use lm_storage::KeyValueStore;

use crate::render::{render_history, render_result, render_signs};
use crate::scoring::ScoreSource;
use crate::session::Session;
use crate::share::ShareTarget;
use crate::style::Style;

pub const TITLE: &str = "AI 恋爱契合度测试";

#[derive(Debug, Clone, Copy)]
pub struct ReplOptions {
    pub style: Style,
    pub term_width: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Test,
    ToggleHistory,
    ClearHistory,
    Share,
    Edit,
    Quit,
}

fn parse_choice(line: &str) -> Option<MenuChoice> {
    match line.trim() {
        "1" => Some(MenuChoice::Test),
        "2" => Some(MenuChoice::ToggleHistory),
        "3" => Some(MenuChoice::ClearHistory),
        "4" => Some(MenuChoice::Share),
        "5" => Some(MenuChoice::Edit),
        "0" | "q" | "quit" | "exit" => Some(MenuChoice::Quit),
        _ => None,
    }
}

/// Print `prompt` and read one line. `None` on EOF.
fn prompt_line<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Prompt for every field of one person. A blank answer keeps the current
/// value. Returns `false` on EOF.
fn edit_person<R: BufRead, W: Write, S: KeyValueStore, D: ScoreSource>(
    session: &mut Session<S, D>,
    party: Party,
    input: &mut R,
    out: &mut W,
) -> io::Result<bool> {
    writeln!(out, "\n── {party} ──")?;
    for field in Field::ALL {
        if field == Field::Zodiac {
            writeln!(out, "{}", render_signs())?;
        }
        let current = session.draft(party).get(field).to_string();
        let prompt = if current.is_empty() {
            format!("{field}: ")
        } else {
            format!("{field} [{current}]: ")
        };
        let Some(answer) = prompt_line(input, out, &prompt)? else {
            return Ok(false);
        };
        let answer = answer.trim();
        if answer.is_empty() {
            continue;
        }
        let value = match field {
            // Normalize menu numbers and English names to the Chinese name.
            Field::Zodiac => answer
                .parse::<ZodiacSign>()
                .map(|sign| sign.name().to_string())
                .unwrap_or_else(|_| answer.to_string()),
            _ => answer.to_string(),
        };
        session.set_field(party, field, value);
    }
    Ok(true)
}

fn edit_both<R: BufRead, W: Write, S: KeyValueStore, D: ScoreSource>(
    session: &mut Session<S, D>,
    input: &mut R,
    out: &mut W,
) -> io::Result<bool> {
    Ok(edit_person(session, Party::First, input, out)?
        && edit_person(session, Party::Second, input, out)?)
}

fn write_validation_error<W: Write>(
    out: &mut W,
    err: &ValidationError,
    style: &Style,
) -> io::Result<()> {
    writeln!(out, "{}⚠ {err}{}", style.red_start(), style.reset())?;
    if let ValidationError::Incomplete { missing } = err {
        for (party, field) in missing {
            writeln!(out, "  · {party}: {field}")?;
        }
    }
    Ok(())
}

fn menu_line<S: KeyValueStore, D: ScoreSource>(session: &Session<S, D>) -> String {
    let history_label = if session.history_visible() {
        "隐藏历史"
    } else {
        "查看历史"
    };
    format!("\n[1] 开始测试  [2] {history_label}  [3] 清除历史  [4] 分享结果  [5] 编辑信息  [0] 退出")
}

/// Run the interactive session until the user quits or input ends.
pub async fn run_interactive<R, W, S, D>(
    session: &mut Session<S, D>,
    input: &mut R,
    out: &mut W,
    share: &mut dyn ShareTarget,
    options: ReplOptions,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    S: KeyValueStore,
    D: ScoreSource,
{
    let style = options.style;
    writeln!(
        out,
        "{}{}{TITLE}{}",
        style.bold_start(),
        style.purple_start(),
        style.reset()
    )?;
    if !edit_both(session, input, out)? {
        return Ok(());
    }

    loop {
        writeln!(out, "{}", menu_line(session))?;
        let Some(line) = prompt_line(input, out, "> ")? else {
            break;
        };
        let Some(choice) = parse_choice(&line) else {
            writeln!(out, "未知选项: {}", line.trim())?;
            continue;
        };

        match choice {
            MenuChoice::Test => {
                let pending = match session.begin_submit() {
                    Ok(pending) => pending,
                    Err(e) => {
                        write_validation_error(out, &e, &style)?;
                        continue;
                    }
                };
                if session.is_busy() {
                    writeln!(out, "{}⌛ 分析中...{}", style.dim_start(), style.reset())?;
                    out.flush()?;
                }
                let outcome = session.analyze(pending).await;
                writeln!(
                    out,
                    "\n{}",
                    render_result(&outcome.result, options.term_width, &style)
                )?;
                if let Some(e) = outcome.persist_error {
                    writeln!(
                        out,
                        "{}warning: 历史记录未能保存: {e}{}",
                        style.yellow_start(),
                        style.reset()
                    )?;
                }
                if session.history_visible() {
                    writeln!(out, "\n{}", render_history(session.history(), &style))?;
                }
            }
            MenuChoice::ToggleHistory => {
                if session.toggle_history() {
                    writeln!(out, "\n{}", render_history(session.history(), &style))?;
                } else {
                    writeln!(out, "历史已隐藏")?;
                }
            }
            MenuChoice::ClearHistory => {
                let Some(answer) = prompt_line(input, out, "确定要清除所有历史记录吗？(y/N) ")?
                else {
                    break;
                };
                let confirmed = matches!(answer.trim().to_lowercase().as_str(), "y" | "yes");
                match session.clear_history(confirmed) {
                    Ok(true) => writeln!(out, "历史记录已清除")?,
                    Ok(false) => writeln!(out, "已取消")?,
                    Err(e) => writeln!(
                        out,
                        "{}warning: 清除存储失败: {e}{}",
                        style.yellow_start(),
                        style.reset()
                    )?,
                }
            }
            MenuChoice::Share => match session.share(share) {
                Ok(Some(outcome)) => {
                    let message = outcome.message();
                    if !message.is_empty() {
                        writeln!(out, "{message}")?;
                    }
                }
                Ok(None) => writeln!(out, "还没有测试结果可以分享")?,
                Err(e) => writeln!(out, "{}error: {e}{}", style.red_start(), style.reset())?,
            },
            MenuChoice::Edit => {
                if !edit_both(session, input, out)? {
                    break;
                }
            }
            MenuChoice::Quit => break,
        }
    }
    Ok(())
}
