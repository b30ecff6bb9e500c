//! Text rendering of results, history, and the sign list.

use lm_protocol::{CompatibilityResult, HistoryRecord, ZodiacSign};

use crate::style::{center, Style};

pub const RESULT_FOOTER: &str = "💕 AI匹配分析仅供参考，真爱需要用心经营 💕";

const MIN_BAR: usize = 10;
const MAX_BAR: usize = 50;

/// Current terminal width, 80 when unknown.
pub fn terminal_width() -> u16 {
    crossterm::terminal::size().map(|(w, _)| w).unwrap_or(80)
}

/// Progress-bar width for a terminal of `term_width` columns.
pub fn bar_width(term_width: u16) -> usize {
    (term_width as usize).saturating_sub(4).clamp(MIN_BAR, MAX_BAR)
}

/// `width` cells, filled in proportion to `score`.
pub fn score_bar(score: u8, width: usize, style: &Style) -> String {
    let filled = (score.min(100) as usize * width) / 100;
    format!(
        "{}{}{}{}",
        style.magenta_start(),
        "█".repeat(filled),
        style.reset(),
        "░".repeat(width - filled)
    )
}

pub fn render_result(result: &CompatibilityResult, term_width: u16, style: &Style) -> String {
    let width = bar_width(term_width);
    let mut out = String::new();
    out.push_str(&format!(
        "{}{}❤ 匹配结果{}\n",
        style.bold_start(),
        style.purple_start(),
        style.reset()
    ));
    out.push_str(&score_bar(result.score, width, style));
    out.push('\n');
    out.push_str(&center(&format!("{}% 契合度", result.score), width));
    out.push_str("\n\n");
    out.push_str(&result.analysis);
    out.push_str("\n\n");
    out.push_str(&format!(
        "{}{}{}\n",
        style.dim_start(),
        center(RESULT_FOOTER, width),
        style.reset()
    ));
    out
}

pub fn render_history(records: &[HistoryRecord], style: &Style) -> String {
    let mut out = format!(
        "{}{}历史记录{}\n",
        style.bold_start(),
        style.purple_start(),
        style.reset()
    );
    if records.is_empty() {
        out.push_str(&format!("{}暂无历史记录{}\n", style.dim_start(), style.reset()));
        return out;
    }
    for record in records {
        out.push('\n');
        out.push_str(&format!(
            "{}{}{}\n",
            style.dim_start(),
            record.timestamp,
            style.reset()
        ));
        out.push_str(&format!(
            "{}{} ❤ {}{}\n",
            style.purple_start(),
            record.person1.name,
            record.person2.name,
            style.reset()
        ));
        out.push_str(&format!(
            "{}★{} 契合度: {}%\n",
            style.yellow_start(),
            style.reset(),
            record.score
        ));
    }
    out
}

/// Numbered sign menu, two columns per line.
pub fn render_signs() -> String {
    ZodiacSign::ALL
        .iter()
        .enumerate()
        .map(|(i, sign)| format!("{:>2}. {} ({})", i + 1, sign.name(), sign.english()))
        .collect::<Vec<_>>()
        .chunks(2)
        .map(|pair| pair.join("    "))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lm_protocol::{PersonRecord, ScoreBreakdown};

    fn result(score: u8) -> CompatibilityResult {
        CompatibilityResult {
            score,
            analysis: "analysis body".to_string(),
            breakdown: ScoreBreakdown {
                base: score as i32,
                zodiac_adjustment: 0,
                age_gap: 0,
                age_adjustment: 0,
            },
        }
    }

    #[test]
    fn bar_width_clamped() {
        assert_eq!(bar_width(0), MIN_BAR);
        assert_eq!(bar_width(40), 36);
        assert_eq!(bar_width(300), MAX_BAR);
    }

    #[test]
    fn score_bar_proportions() {
        let style = Style::disabled();
        assert_eq!(score_bar(0, 10, &style), "░".repeat(10));
        assert_eq!(score_bar(100, 10, &style), "█".repeat(10));
        assert_eq!(score_bar(55, 10, &style), format!("{}{}", "█".repeat(5), "░".repeat(5)));
    }

    #[test]
    fn result_card_contents() {
        let out = render_result(&result(73), 80, &Style::disabled());
        assert!(out.starts_with("❤ 匹配结果\n"));
        assert!(out.contains("73% 契合度"));
        assert!(out.contains("analysis body"));
        assert!(out.contains(RESULT_FOOTER));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn empty_history() {
        let out = render_history(&[], &Style::disabled());
        assert_eq!(out, "历史记录\n暂无历史记录\n");
    }

    #[test]
    fn history_entries() {
        let records = vec![HistoryRecord {
            timestamp: "2024-01-01 12:00:00".to_string(),
            person1: PersonRecord::new("小明", 25, ZodiacSign::Aries),
            person2: PersonRecord::new("小红", 27, ZodiacSign::Taurus),
            score: 88,
            analysis: String::new(),
        }];
        let out = render_history(&records, &Style::disabled());
        assert!(out.contains("2024-01-01 12:00:00\n"));
        assert!(out.contains("小明 ❤ 小红\n"));
        assert!(out.contains("★ 契合度: 88%\n"));
    }

    #[test]
    fn sign_menu_lists_all() {
        let out = render_signs();
        assert_eq!(out.lines().count(), 6);
        assert!(out.starts_with(" 1. 白羊座 (aries)"));
        assert!(out.contains("12. 双鱼座 (pisces)"));
    }
}
