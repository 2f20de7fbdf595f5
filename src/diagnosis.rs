use std::fmt;

use serde::Serialize;

use crate::{AnswerStore, Error, MAX_SCORE, QUESTIONS};

/// 総合評価ランク
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Rank {
    D,
    B,
    A,
    S,
}

impl Rank {
    /// 見出し
    pub fn headline(&self) -> &'static str {
        match self {
            Rank::S => "素晴らしい！",
            Rank::A => "あともう少し！",
            Rank::B => "改善の余地あり",
            Rank::D => "要注意",
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            Rank::S => "非常に優秀な食生活です！この調子で現在の習慣を維持しましょう。微調整を行うだけで、さらに健康的な体を手に入れられます。",
            Rank::A => "基本的な意識はできています。あと少し改善すれば完璧です。苦手な部分を意識的にカバーしてみましょう。",
            Rank::B => "食生活が乱れている可能性があります。今のままでは体調や集中力に影響が出るかもしれません。できることから一つずつ始めましょう。",
            Rank::D => "食生活が大きく乱れています。体調を崩す前に、専門家と一緒に生活リズムと食事内容を見直しましょう。",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Rank::S => "S",
            Rank::A => "A",
            Rank::B => "B",
            Rank::D => "D",
        };
        f.write_str(letter)
    }
}

/// 合計点からランクを決める閾値。
///
/// 3段階 (S/A/B) と、低得点帯をさらに B/D に分ける4段階の2種類がある。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankPolicy {
    /// この点数以上で S
    pub s_min: u32,
    /// この点数以上で A
    pub a_min: u32,
    /// この点数未満で D。`None` なら D を使わない。
    pub d_below: Option<u32>,
}

impl RankPolicy {
    pub const fn three_tier() -> Self {
        Self {
            s_min: 22,
            a_min: 15,
            d_below: None,
        }
    }

    pub const fn four_tier() -> Self {
        Self {
            s_min: 22,
            a_min: 15,
            d_below: Some(11),
        }
    }

    pub fn rank(&self, total: u32) -> Rank {
        match total {
            total if total >= self.s_min => Rank::S,
            total if total >= self.a_min => Rank::A,
            total if self.d_below.is_some_and(|limit| total < limit) => Rank::D,
            _ => Rank::B,
        }
    }
}

impl Default for RankPolicy {
    fn default() -> Self {
        Self::three_tier()
    }
}

/// 最も点数の低かった設問
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeakPoint {
    pub question_id: u32,
    pub short_title: String,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advice {
    pub question_id: u32,
    pub short_title: String,
    pub text: String,
}

/// レーダーチャートの1軸分
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RadarPoint {
    pub subject: String,
    pub value: u8,
    pub full_mark: u8,
}

/// 診断結果。回答から都度算出し、保存はしない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub total: u32,
    pub rank: Rank,
    pub headline: &'static str,
    pub body: &'static str,
    pub weak_point: WeakPoint,
    pub advice: Vec<Advice>,
    /// 設問1〜5の回答値
    pub scores: Vec<u8>,
}

impl Diagnosis {
    /// 回答がこの値以下の設問にアドバイスを出す
    pub const ADVICE_THRESHOLD: u8 = 2;

    pub fn radar(&self) -> Vec<RadarPoint> {
        QUESTIONS
            .questions()
            .iter()
            .zip(&self.scores)
            .map(|(question, &value)| RadarPoint {
                subject: question.short_title.clone(),
                value,
                full_mark: MAX_SCORE,
            })
            .collect()
    }
}

impl AnswerStore {
    /// 合計点方式で診断する
    ///
    /// ○ 5設問の回答値 (1〜5) をそのまま合計する (5〜25点)。
    /// ○ 合計点を `policy` の閾値に当てはめてランクを決める。
    /// ○ 最も点数の低い設問を弱点とする。同点の場合は設問番号の小さい方。
    /// ○ 回答が2以下の設問ごとに、設問順でアドバイスを並べる。
    pub fn to_diagnosis(&self, policy: &RankPolicy) -> Result<Diagnosis, Error> {
        if !self.is_complete() {
            return Err(Error::NotFullfilled);
        }

        let mut total = 0u32;
        let mut scores = Vec::with_capacity(QUESTIONS.questions().len());
        let mut weak_point: Option<WeakPoint> = None;
        let mut advice = Vec::new();

        for question in QUESTIONS.questions() {
            let score = self.get(question.id).ok_or(Error::NotFullfilled)?;
            total += u32::from(score);
            scores.push(score);

            if weak_point.as_ref().map_or(true, |weak| score < weak.score) {
                weak_point = Some(WeakPoint {
                    question_id: question.id,
                    short_title: question.short_title.clone(),
                    score,
                });
            }

            if score <= Diagnosis::ADVICE_THRESHOLD {
                advice.push(Advice {
                    question_id: question.id,
                    short_title: question.short_title.clone(),
                    text: question.advice.clone(),
                });
            }
        }

        let rank = policy.rank(total);
        Ok(Diagnosis {
            total,
            rank,
            headline: rank.headline(),
            body: rank.body(),
            weak_point: weak_point.ok_or(Error::NotFullfilled)?,
            advice,
            scores,
        })
    }
}
