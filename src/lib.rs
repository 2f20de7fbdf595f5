use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::Deserialize;

pub mod bulk;
pub mod config;
pub mod consultation;
pub mod diagnosis;
pub mod flow;
pub mod gateway;
pub mod telemetry;

pub use bulk::read_bulk;
pub use consultation::{ConsultationData, ConsultationField};
pub use diagnosis::{Diagnosis, Rank, RankPolicy};
pub use flow::{Effect, Event, Region, Session, View, ViewFlags};
pub use gateway::{Gateway, GatewayError, HttpGateway, Submission};

/// 設問数
pub const QUESTION_COUNT: usize = 5;

/// 回答値の上限。レーダーチャートの満点にもなる。
pub const MAX_SCORE: u8 = 5;

pub static QUESTIONS: Lazy<NutritionSurvey> = Lazy::new(|| {
    serde_json::from_str(include_str!("../resources/questions.json"))
        .expect("bundled question catalog must be valid JSON")
});

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub value: u8,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    pub id: u32,
    /// 設問文
    pub title: String,
    /// チャートのラベルに使う短い名称
    pub short_title: String,
    pub choices: Vec<Choice>,
    /// 回答が2以下だったときに表示するアドバイス
    pub advice: String,
}

impl Question {
    /// 回答値に対応する選択肢の文言
    pub fn label_for(&self, value: u8) -> Option<&str> {
        self.choices
            .iter()
            .find(|choice| choice.value == value)
            .map(|choice| choice.label.as_str())
    }
}

impl From<Question> for u32 {
    fn from(q: Question) -> Self {
        q.id
    }
}

/// 食生活診断5設問のマスタ表現
#[derive(Debug, Deserialize)]
pub struct NutritionSurvey {
    pub questions: Vec<Question>,
}

impl NutritionSurvey {
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// 設問番号を指定して設問を取得する
    pub fn question(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }

    /// 全設問を表示順で取得する
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

/// 設問番号から選択された回答値への対応表。
///
/// 値は利用者の選択によってのみ作成・上書きされ、リセット時以外に削除されることはない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerStore {
    values: BTreeMap<u32, u8>,
}

impl AnswerStore {
    /// 設問番号を指定して回答を格納する
    /// その設問の選択肢にない回答値は認めない。
    pub fn insert(&mut self, question_id: u32, value: u8) -> Result<(), Error> {
        let question = QUESTIONS
            .question(question_id)
            .ok_or(Error::IllegalQuestion(question_id))?;
        if question.label_for(value).is_none() {
            return Err(Error::IllegalAnswer {
                question: question_id,
                value,
            });
        }
        self.values.insert(question_id, value);
        Ok(())
    }

    /// 設問1から順に回答を並べたスライスから組み立てる
    pub fn from_values(values: &[u8]) -> Result<Self, Error> {
        let mut store = Self::default();
        for (index, &value) in values.iter().enumerate() {
            let question_id = u32::try_from(index + 1).map_err(|_| Error::IllegalQuestion(0))?;
            store.insert(question_id, value)?;
        }
        Ok(store)
    }

    pub fn get(&self, question_id: u32) -> Option<u8> {
        self.values.get(&question_id).copied()
    }

    /// 全設問に回答済みか
    pub fn is_complete(&self) -> bool {
        QUESTIONS
            .questions()
            .iter()
            .all(|question| self.values.contains_key(&question.id))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 設問番号の昇順で回答を返す
    pub fn iter(&self) -> impl Iterator<Item = (u32, u8)> + '_ {
        self.values.iter().map(|(&id, &value)| (id, value))
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 存在しない設問番号
    #[error("設問番号 {0} は存在しません")]
    IllegalQuestion(u32),
    /// 回答選択肢が違反
    #[error("設問 {question} に回答値 {value} は選べません")]
    IllegalAnswer { question: u32, value: u8 },
    /// 回答欠落
    #[error("すべての質問にお答えください")]
    NotFullfilled,
    #[error("{from:?} の画面では {event:?} を受け付けられません")]
    IllegalTransition { from: View, event: Event },
    #[error("未入力の必須項目があります: {}", consultation::join_labels(.0))]
    MissingFields(Vec<ConsultationField>),
    #[error(transparent)]
    Submission(#[from] GatewayError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] telemetry::TelemetryError),
}
