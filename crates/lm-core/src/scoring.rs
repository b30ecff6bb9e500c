//! Compatibility scoring.
//!
//! The score is a novelty draw, not a model: a uniform base, a uniform
//! zodiac adjustment, and a fixed age-gap adjustment, clamped to `0..=100`.
//! The random draws come from a [`ScoreSource`] so callers and tests can
//! pin them.

use lm_protocol::{CompatibilityResult, PersonRecord, ScoreBreakdown};
use rand::Rng;
use tracing::debug;

/// Source of the two random draws that feed a score.
pub trait ScoreSource {
    /// Base score in `0..=99`.
    fn base_score(&mut self) -> i32;
    /// Zodiac adjustment in `-10..=9`.
    fn zodiac_adjustment(&mut self) -> i32;
}

/// Uniform draws from any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomDraws<R: Rng>(pub R);

impl<R: Rng> ScoreSource for RandomDraws<R> {
    fn base_score(&mut self) -> i32 {
        self.0.gen_range(0..100)
    }

    fn zodiac_adjustment(&mut self) -> i32 {
        self.0.gen_range(-10..10)
    }
}

/// Always returns the same draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDraws {
    pub base: i32,
    pub zodiac: i32,
}

impl ScoreSource for FixedDraws {
    fn base_score(&mut self) -> i32 {
        self.base
    }

    fn zodiac_adjustment(&mut self) -> i32 {
        self.zodiac
    }
}

/// Age-gap term: `+5` under 5 years, `0` under 10, `-5` otherwise.
pub fn age_adjustment(age_gap: u32) -> i32 {
    if age_gap < 5 {
        5
    } else if age_gap < 10 {
        0
    } else {
        -5
    }
}

/// Advice paragraph for a final score.
pub fn advice(score: u8) -> &'static str {
    match score {
        90..=u8::MAX => "你们是天造地设的一对！珍惜这份难得的缘分。",
        80..=89 => "你们非常般配！继续保持甜蜜。",
        70..=79 => "有很好的发展空间，要多沟通。",
        50..=69 => "需要更多的理解与包容，爱情需要经营。",
        _ => "真爱需要更多的耐心和包容，不要轻易放弃。",
    }
}

fn zodiac_remark(zodiac_adjustment: i32) -> &'static str {
    if zodiac_adjustment > 0 {
        "非常合适！"
    } else {
        "需要多一些包容"
    }
}

fn age_remark(age_gap: u32) -> &'static str {
    if age_gap < 5 {
        "(年龄差异适中)"
    } else {
        "(需要克服代沟)"
    }
}

/// Score a pair of validated people.
pub fn compute_compatibility<D: ScoreSource + ?Sized>(
    person1: &PersonRecord,
    person2: &PersonRecord,
    source: &mut D,
) -> CompatibilityResult {
    let base = source.base_score();
    let zodiac_adjustment = source.zodiac_adjustment();
    let age_gap = person1.age.abs_diff(person2.age);
    let age_adjustment = age_adjustment(age_gap);

    let score = (base + zodiac_adjustment + age_adjustment).clamp(0, 100) as u8;
    let breakdown = ScoreBreakdown {
        base,
        zodiac_adjustment,
        age_gap,
        age_adjustment,
    };
    debug!(?breakdown, score, "computed compatibility");

    CompatibilityResult {
        score,
        analysis: build_analysis(person1, person2, score, &breakdown),
        breakdown,
    }
}

fn build_analysis(
    person1: &PersonRecord,
    person2: &PersonRecord,
    score: u8,
    breakdown: &ScoreBreakdown,
) -> String {
    format!(
        "💘 匹配度分析结果 💘\n\
         {name1} 和 {name2} 的总体契合度为 {score}%\n\
         \n✨ 详细分析：\
         \n· 星座相性：{zodiac1} 和 {zodiac2} {zodiac_remark}\
         \n· 年龄差异：{gap}岁 {age_remark}\
         \n\n💝 爱情建议：\
         \n{advice}",
        name1 = person1.name,
        name2 = person2.name,
        zodiac1 = person1.zodiac,
        zodiac2 = person2.zodiac,
        zodiac_remark = zodiac_remark(breakdown.zodiac_adjustment),
        gap = breakdown.age_gap,
        age_remark = age_remark(breakdown.age_gap),
        advice = advice(score),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use lm_protocol::ZodiacSign;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn person(name: &str, age: u32, zodiac: ZodiacSign) -> PersonRecord {
        PersonRecord::new(name, age, zodiac)
    }

    fn pair(age1: u32, age2: u32) -> (PersonRecord, PersonRecord) {
        (
            person("A", age1, ZodiacSign::Aries),
            person("B", age2, ZodiacSign::Taurus),
        )
    }

    #[test]
    fn score_always_in_range() {
        let mut draws = RandomDraws(StdRng::seed_from_u64(7));
        for (age1, age2) in [(25, 27), (18, 60), (40, 46), (0, 0), (99, 1)] {
            let (a, b) = pair(age1, age2);
            for _ in 0..500 {
                let result = compute_compatibility(&a, &b, &mut draws);
                assert!(result.score <= 100);
            }
        }
    }

    #[test]
    fn random_draws_stay_in_bounds() {
        let mut draws = RandomDraws(StdRng::seed_from_u64(42));
        for _ in 0..2000 {
            let base = draws.base_score();
            let zodiac = draws.zodiac_adjustment();
            assert!((0..=99).contains(&base));
            assert!((-10..=9).contains(&zodiac));
        }
    }

    #[test]
    fn age_adjustment_bands() {
        assert_eq!(age_adjustment(0), 5);
        assert_eq!(age_adjustment(4), 5);
        assert_eq!(age_adjustment(5), 0);
        assert_eq!(age_adjustment(9), 0);
        assert_eq!(age_adjustment(10), -5);
        assert_eq!(age_adjustment(60), -5);
    }

    #[test]
    fn pinned_draws_apply_age_adjustment() {
        let mut draws = FixedDraws { base: 50, zodiac: 0 };
        for (age1, age2, expected) in [(25, 27, 55), (30, 25, 50), (20, 29, 50), (20, 30, 45)] {
            let (a, b) = pair(age1, age2);
            let result = compute_compatibility(&a, &b, &mut draws);
            assert_eq!(result.score, expected, "ages {age1} and {age2}");
        }
    }

    #[test]
    fn age_gap_is_symmetric() {
        let mut draws = FixedDraws { base: 40, zodiac: 3 };
        let (a, b) = pair(22, 35);
        let forward = compute_compatibility(&a, &b, &mut draws);
        let backward = compute_compatibility(&b, &a, &mut draws);
        assert_eq!(forward.breakdown.age_gap, 13);
        assert_eq!(backward.breakdown.age_gap, 13);
        assert_eq!(forward.score, backward.score);
    }

    #[test]
    fn score_clamps_high() {
        let (a, b) = pair(25, 25);
        let result = compute_compatibility(&a, &b, &mut FixedDraws { base: 99, zodiac: 9 });
        assert_eq!(result.score, 100);
        assert_eq!(result.breakdown.base, 99);
    }

    #[test]
    fn score_clamps_low() {
        let (a, b) = pair(20, 50);
        let result = compute_compatibility(&a, &b, &mut FixedDraws { base: 0, zodiac: -10 });
        assert_eq!(result.score, 0);
        assert_eq!(result.breakdown.age_adjustment, -5);
    }

    #[test]
    fn advice_tiers() {
        assert_eq!(advice(100), "你们是天造地设的一对！珍惜这份难得的缘分。");
        assert_eq!(advice(90), "你们是天造地设的一对！珍惜这份难得的缘分。");
        assert_eq!(advice(89), "你们非常般配！继续保持甜蜜。");
        assert_eq!(advice(80), "你们非常般配！继续保持甜蜜。");
        assert_eq!(advice(79), "有很好的发展空间，要多沟通。");
        assert_eq!(advice(70), "有很好的发展空间，要多沟通。");
        assert_eq!(advice(69), "需要更多的理解与包容，爱情需要经营。");
        assert_eq!(advice(50), "需要更多的理解与包容，爱情需要经营。");
        assert_eq!(advice(49), "真爱需要更多的耐心和包容，不要轻易放弃。");
        assert_eq!(advice(0), "真爱需要更多的耐心和包容，不要轻易放弃。");
    }

    #[test]
    fn analysis_text_layout() {
        let a = person("小明", 25, ZodiacSign::Aries);
        let b = person("小红", 27, ZodiacSign::Taurus);
        let result = compute_compatibility(&a, &b, &mut FixedDraws { base: 80, zodiac: 5 });
        assert_eq!(result.score, 90);
        assert_eq!(
            result.analysis,
            "💘 匹配度分析结果 💘\n\
             小明 和 小红 的总体契合度为 90%\n\
             \n✨ 详细分析：\
             \n· 星座相性：白羊座 和 金牛座 非常合适！\
             \n· 年龄差异：2岁 (年龄差异适中)\
             \n\n💝 爱情建议：\
             \n你们是天造地设的一对！珍惜这份难得的缘分。"
        );
    }

    #[test]
    fn zero_zodiac_adjustment_needs_tolerance() {
        let (a, b) = pair(20, 32);
        let result = compute_compatibility(&a, &b, &mut FixedDraws { base: 30, zodiac: 0 });
        assert!(result.analysis.contains("白羊座 和 金牛座 需要多一些包容"));
        assert!(result.analysis.contains("12岁 (需要克服代沟)"));
        assert!(result.analysis.ends_with("真爱需要更多的耐心和包容，不要轻易放弃。"));
    }
}
