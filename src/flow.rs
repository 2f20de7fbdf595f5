//! 画面遷移: 設問 → 診断結果 → 相談フォーム → 送信完了
//!
//! 遷移そのものは [`View::transition`] の純粋関数で決まり、送信などの副作用は
//! [`Session`] が受け持つ。

use tracing::{info, warn};

use crate::consultation::ConsultationData;
use crate::diagnosis::{Diagnosis, RankPolicy};
use crate::gateway::{self, Gateway};
use crate::{AnswerStore, Error};

/// 相談送信に失敗したときにフォームへ出す文言
pub const SUBMISSION_FAILED_MESSAGE: &str =
    "送信に失敗しました。通信環境をご確認の上、再度お試しください。";

/// 表示中の画面。常にどれか一つだけ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Survey,
    Result,
    Consultation,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Diagnose,
    StartConsultation,
    Back,
    ConsultationSent,
    Reset,
}

/// スクロール先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Top,
    Result,
    Consultation,
}

/// 遷移に伴って画面側で行う処理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    ScrollTo(Region),
}

impl View {
    /// 受け付けられない組み合わせは `IllegalTransition`。
    /// `Diagnose` の回答完了チェックは呼び出し側で行う。
    pub fn transition(self, event: Event) -> Result<(View, Effect), Error> {
        match (self, event) {
            (_, Event::Reset) => Ok((View::Survey, Effect::ScrollTo(Region::Top))),
            (View::Survey, Event::Diagnose) => {
                Ok((View::Result, Effect::ScrollTo(Region::Result)))
            }
            (View::Result, Event::StartConsultation) => Ok((
                View::Consultation,
                Effect::ScrollTo(Region::Consultation),
            )),
            (View::Consultation, Event::Back) => Ok((View::Result, Effect::None)),
            (View::Consultation, Event::ConsultationSent) => Ok((View::Complete, Effect::None)),
            (from, event) => Err(Error::IllegalTransition { from, event }),
        }
    }

    pub fn flags(self) -> ViewFlags {
        match self {
            View::Survey => ViewFlags::new(false, false, false),
            View::Result => ViewFlags::new(true, false, false),
            View::Consultation => ViewFlags::new(true, true, false),
            View::Complete => ViewFlags::new(true, true, true),
        }
    }
}

/// 画面の出し分けに使う3つのフラグ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewFlags {
    pub show_result: bool,
    pub show_consultation: bool,
    pub consultation_complete: bool,
}

impl ViewFlags {
    pub const fn new(show_result: bool, show_consultation: bool, consultation_complete: bool) -> Self {
        Self {
            show_result,
            show_consultation,
            consultation_complete,
        }
    }

    /// 4画面のどれにも当たらない組み合わせは `None`
    pub fn view(&self) -> Option<View> {
        match (
            self.show_result,
            self.show_consultation,
            self.consultation_complete,
        ) {
            (false, false, false) => Some(View::Survey),
            (true, false, false) => Some(View::Result),
            (true, true, false) => Some(View::Consultation),
            (true, true, true) => Some(View::Complete),
            _ => None,
        }
    }
}

/// 1人分の診断セッション。回答・自由記述・相談フォームの内容と表示中の画面を持つ。
#[derive(Debug, Clone, Default)]
pub struct Session {
    answers: AnswerStore,
    free_comment: String,
    consultation: ConsultationData,
    view: View,
    banner: Option<String>,
    policy: RankPolicy,
}

impl Session {
    pub fn new(policy: RankPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn flags(&self) -> ViewFlags {
        self.view.flags()
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn free_comment(&self) -> &str {
        &self.free_comment
    }

    pub fn consultation(&self) -> &ConsultationData {
        &self.consultation
    }

    pub fn consultation_mut(&mut self) -> &mut ConsultationData {
        &mut self.consultation
    }

    /// 相談フォームに出すエラー
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn policy(&self) -> &RankPolicy {
        &self.policy
    }

    /// 設問画面でのみ回答を受け付ける
    pub fn answer(&mut self, question_id: u32, value: u8) -> Result<(), Error> {
        self.ensure_survey(Event::Diagnose)?;
        self.answers.insert(question_id, value)
    }

    pub fn set_free_comment(&mut self, comment: impl Into<String>) -> Result<(), Error> {
        self.ensure_survey(Event::Diagnose)?;
        self.free_comment = comment.into();
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.answers.is_complete()
    }

    /// 現在の回答から診断を算出する。未回答があれば `None`。
    pub fn diagnosis(&self) -> Option<Diagnosis> {
        self.answers.to_diagnosis(&self.policy).ok()
    }

    /// 診断する。
    ///
    /// 未回答があれば何も送らず画面もそのまま。送信結果にかかわらず結果画面へ進む。
    pub async fn diagnose<G: Gateway>(&mut self, gateway: &G) -> Result<Effect, Error> {
        if self.view != View::Survey {
            return Err(Error::IllegalTransition {
                from: self.view,
                event: Event::Diagnose,
            });
        }
        if !self.is_complete() {
            return Err(Error::NotFullfilled);
        }

        gateway::submit_diagnosis(gateway, &self.answers, &self.free_comment).await;
        self.apply(Event::Diagnose)
    }

    pub fn start_consultation(&mut self) -> Result<Effect, Error> {
        self.apply(Event::StartConsultation)
    }

    pub fn back(&mut self) -> Result<Effect, Error> {
        self.apply(Event::Back)
    }

    /// 相談内容を送る。
    ///
    /// 必須項目が欠けていれば送らない。送信に失敗したらフォームに留まり、
    /// 入力内容を残したままエラー文言を出す。
    pub async fn submit_consultation<G: Gateway>(&mut self, gateway: &G) -> Result<Effect, Error> {
        if self.view != View::Consultation {
            return Err(Error::IllegalTransition {
                from: self.view,
                event: Event::ConsultationSent,
            });
        }
        let missing = self.consultation.missing_fields();
        if !missing.is_empty() {
            return Err(Error::MissingFields(missing));
        }

        self.banner = None;
        if let Err(err) =
            gateway::submit_consultation(gateway, &self.consultation, &self.answers).await
        {
            warn!("consultation stays open for retry");
            self.banner = Some(SUBMISSION_FAILED_MESSAGE.to_string());
            return Err(err.into());
        }
        self.apply(Event::ConsultationSent)
    }

    /// どの画面からでも設問画面に戻り、入力をすべて消す
    pub fn reset(&mut self) -> Effect {
        self.answers.clear();
        self.free_comment.clear();
        self.consultation = ConsultationData::default();
        self.banner = None;
        let from = self.view;
        self.view = View::Survey;
        info!(?from, "session reset");
        Effect::ScrollTo(Region::Top)
    }

    fn apply(&mut self, event: Event) -> Result<Effect, Error> {
        let (next, effect) = self.view.transition(event)?;
        info!(from = ?self.view, to = ?next, ?event, "view transition");
        self.view = next;
        Ok(effect)
    }

    fn ensure_survey(&self, event: Event) -> Result<(), Error> {
        match self.view {
            View::Survey => Ok(()),
            from => Err(Error::IllegalTransition { from, event }),
        }
    }
}
