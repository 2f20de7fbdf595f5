//! 診断結果・相談内容をスプレッドシート側のエンドポイントへ送る。
//!
//! 送信先はレスポンスを返さない前提で扱う。ステータスも本文も読まず、
//! 通信そのものが失敗したときだけエラーになる。

use std::fmt;
use std::future::Future;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, error, info, warn};

use crate::config::GatewayConfig;
use crate::consultation::{ConsultationData, ConsultationField};
use crate::{AnswerStore, QUESTIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    Diagnosis,
    Consultation,
}

impl SubmissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionKind::Diagnosis => "diagnosis",
            SubmissionKind::Consultation => "consultation",
        }
    }
}

impl fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// フォーム形式で送るキーと値の並び
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    kind: SubmissionKind,
    fields: Vec<(String, String)>,
}

impl Submission {
    fn new(kind: SubmissionKind, at: DateTime<Utc>) -> Self {
        let mut submission = Self {
            kind,
            fields: Vec::new(),
        };
        submission.push("type", kind.as_str());
        submission.push("timestamp", at.to_rfc3339_opts(SecondsFormat::Millis, true));
        submission
    }

    fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    /// `type=diagnosis`, `timestamp`, 設問ごとの `Q{n}_score` と `Q{n}_answer`, `free_comment`
    pub fn diagnosis(answers: &AnswerStore, free_comment: &str, at: DateTime<Utc>) -> Self {
        let mut submission = Self::new(SubmissionKind::Diagnosis, at);
        for question in QUESTIONS.questions() {
            let value = answers.get(question.id);
            let label = value
                .and_then(|value| question.label_for(value))
                .unwrap_or_default();
            submission.push(
                format!("Q{}_score", question.id),
                value.map(|v| v.to_string()).unwrap_or_default(),
            );
            submission.push(format!("Q{}_answer", question.id), label);
        }
        submission.push("free_comment", free_comment);
        submission
    }

    /// 相談フォームの全項目と、元になった診断の点数 (`diag_Q{n}_score`)
    pub fn consultation(data: &ConsultationData, answers: &AnswerStore, at: DateTime<Utc>) -> Self {
        let mut submission = Self::new(SubmissionKind::Consultation, at);
        for field in ConsultationField::ALL {
            submission.push(field.key(), data.value(field));
        }
        for question in QUESTIONS.questions() {
            submission.push(
                format!("diag_Q{}_score", question.id),
                answers
                    .get(question.id)
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            );
        }
        submission
    }

    pub fn kind(&self) -> SubmissionKind {
        self.kind
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("送信に失敗しました: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("HTTP クライアントを初期化できません: {0}")]
    Client(#[source] reqwest::Error),
}

/// 外部エンドポイントへの送信口
pub trait Gateway {
    fn send(
        &self,
        submission: &Submission,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}

/// フォーム形式で POST する。レスポンスは読まない。
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl HttpGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(GatewayError::Client)?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }
}

impl Gateway for HttpGateway {
    async fn send(&self, submission: &Submission) -> Result<(), GatewayError> {
        let Some(endpoint) = self.endpoint.as_deref() else {
            warn!(kind = %submission.kind, "submission endpoint is not configured, skipping");
            return Ok(());
        };

        debug!(kind = %submission.kind, fields = submission.fields.len(), "posting submission");
        self.client
            .post(endpoint)
            .form(&submission.fields)
            .send()
            .await
            .map_err(|err| GatewayError::Transport(Box::new(err)))?;

        info!(kind = %submission.kind, "submission sent");
        Ok(())
    }
}

/// 診断結果を送る。失敗してもログに残すだけで呼び出し側には返さない。
pub async fn submit_diagnosis<G: Gateway>(gateway: &G, answers: &AnswerStore, free_comment: &str) {
    let submission = Submission::diagnosis(answers, free_comment, Utc::now());
    if let Err(err) = gateway.send(&submission).await {
        error!(error = %err, "failed to submit diagnosis");
    }
}

/// 相談内容を送る。失敗はログに残したうえで呼び出し側に返す。
pub async fn submit_consultation<G: Gateway>(
    gateway: &G,
    data: &ConsultationData,
    answers: &AnswerStore,
) -> Result<(), GatewayError> {
    let submission = Submission::consultation(data, answers, Utc::now());
    let result = gateway.send(&submission).await;
    if let Err(err) = &result {
        error!(error = %err, "failed to submit consultation");
    }
    result
}
