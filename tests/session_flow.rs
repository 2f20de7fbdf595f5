use simple_nutricheck::consultation::ConsultationField;
use simple_nutricheck::flow::SUBMISSION_FAILED_MESSAGE;
use simple_nutricheck::gateway::SubmissionKind;
use simple_nutricheck::{
    Effect, Error, Gateway, GatewayError, RankPolicy, Region, Session, Submission, View,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// 送信内容を記録するだけのゲートウェイ
#[derive(Default)]
struct RecordingGateway {
    sent: Mutex<Vec<Submission>>,
    fail: AtomicBool,
}

impl RecordingGateway {
    fn failing() -> Self {
        let gateway = Self::default();
        gateway.fail.store(true, Ordering::SeqCst);
        gateway
    }

    fn sent(&self) -> Vec<Submission> {
        self.sent.lock().unwrap().clone()
    }
}

impl Gateway for RecordingGateway {
    async fn send(&self, submission: &Submission) -> Result<(), GatewayError> {
        self.sent.lock().unwrap().push(submission.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "endpoint down",
            ))));
        }
        Ok(())
    }
}

fn answered(values: [u8; 5]) -> Session {
    let mut session = Session::new(RankPolicy::three_tier());
    for (index, value) in values.into_iter().enumerate() {
        session.answer(index as u32 + 1, value).unwrap();
    }
    session
}

fn fill_consultation(session: &mut Session) {
    let data = session.consultation_mut();
    data.set(ConsultationField::Name, "山田 花子");
    data.set(ConsultationField::Age, "30代");
    data.set(ConsultationField::Gender, "女性");
    data.set(ConsultationField::Email, "hanako@example.com");
    data.set(ConsultationField::LivingSituation, "一人暮らし");
    data.set(ConsultationField::MealCount, "2回");
    data.set(ConsultationField::EatingOutFrequency, "ほぼ毎日");
    data.toggle(ConsultationField::Symptoms, "疲れやすい");
    data.set(ConsultationField::ExerciseHabits, "なし");
    data.toggle(ConsultationField::ConsultationPurpose, "体調改善");
    data.set(ConsultationField::ConsultationExperience, "初めて");
    data.set(ConsultationField::Content, "朝食を続けるコツが知りたい");
}

#[tokio::test]
async fn diagnose_is_a_no_op_until_complete() {
    let gateway = RecordingGateway::default();
    let mut session = Session::default();
    for id in 1..=4 {
        session.answer(id, 3).unwrap();
        assert!(!session.is_complete());
        assert!(matches!(
            session.diagnose(&gateway).await,
            Err(Error::NotFullfilled)
        ));
    }
    assert_eq!(session.view(), View::Survey);
    assert!(session.diagnosis().is_none());
    assert!(gateway.sent().is_empty());
}

#[tokio::test]
async fn full_funnel_reaches_complete() {
    let gateway = RecordingGateway::default();
    let mut session = answered([1, 3, 2, 5, 4]);
    session.set_free_comment("肌荒れが気になる").unwrap();

    let effect = session.diagnose(&gateway).await.unwrap();
    assert_eq!(effect, Effect::ScrollTo(Region::Result));
    assert_eq!(session.view(), View::Result);

    let diagnosis = session.diagnosis().unwrap();
    assert_eq!(diagnosis.total, 15);
    assert_eq!(diagnosis.weak_point.question_id, 1);

    assert_eq!(
        session.start_consultation().unwrap(),
        Effect::ScrollTo(Region::Consultation)
    );
    assert_eq!(session.view(), View::Consultation);

    fill_consultation(&mut session);
    session.submit_consultation(&gateway).await.unwrap();
    assert_eq!(session.view(), View::Complete);
    assert!(session.flags().consultation_complete);

    let sent = gateway.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].kind(), SubmissionKind::Diagnosis);
    assert_eq!(sent[0].get("free_comment"), Some("肌荒れが気になる"));
    assert_eq!(sent[0].get("Q3_answer"), Some("ほとんど食べていない"));
    assert_eq!(sent[1].kind(), SubmissionKind::Consultation);
    assert_eq!(sent[1].get("email"), Some("hanako@example.com"));
    assert_eq!(sent[1].get("diag_Q4_score"), Some("5"));

    session.reset();
    assert_eq!(session.view(), View::Survey);
    assert!(session.answers().is_empty());
    assert!(session.consultation().is_empty());
}

#[tokio::test]
async fn diagnosis_failure_still_shows_result() {
    let gateway = RecordingGateway::failing();
    let mut session = answered([5, 5, 5, 5, 5]);

    session.diagnose(&gateway).await.unwrap();
    assert_eq!(session.view(), View::Result);
    assert_eq!(gateway.sent().len(), 1);
    assert_eq!(session.banner(), None);
}

#[tokio::test]
async fn consultation_failure_keeps_form() {
    let gateway = RecordingGateway::default();
    let mut session = answered([2, 2, 2, 2, 2]);
    session.diagnose(&gateway).await.unwrap();
    session.start_consultation().unwrap();
    fill_consultation(&mut session);
    let before = session.consultation().clone();

    let failing = RecordingGateway::failing();
    let outcome = session.submit_consultation(&failing).await;
    assert!(matches!(outcome, Err(Error::Submission(_))));
    assert_eq!(session.view(), View::Consultation);
    assert_eq!(session.consultation(), &before);
    assert_eq!(session.banner(), Some(SUBMISSION_FAILED_MESSAGE));

    // 再送信で完了し、エラー表示は消える
    session.submit_consultation(&gateway).await.unwrap();
    assert_eq!(session.view(), View::Complete);
    assert_eq!(session.banner(), None);
}

#[tokio::test]
async fn missing_fields_block_submission() {
    let gateway = RecordingGateway::default();
    let mut session = answered([4, 4, 4, 4, 4]);
    session.diagnose(&gateway).await.unwrap();
    session.start_consultation().unwrap();
    session
        .consultation_mut()
        .set(ConsultationField::Name, "山田 花子");

    match session.submit_consultation(&gateway).await {
        Err(Error::MissingFields(fields)) => {
            assert_eq!(fields.len(), 11);
            assert!(!fields.contains(&ConsultationField::Name));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(session.view(), View::Consultation);
    assert_eq!(gateway.sent().len(), 1);
}

#[tokio::test]
async fn back_returns_to_result_and_keeps_input() {
    let gateway = RecordingGateway::default();
    let mut session = answered([3, 3, 3, 3, 3]);
    session.diagnose(&gateway).await.unwrap();
    session.start_consultation().unwrap();
    session.consultation_mut().set(ConsultationField::Name, "佐藤");

    session.back().unwrap();
    assert_eq!(session.view(), View::Result);
    assert_eq!(session.consultation().name, "佐藤");

    assert!(matches!(
        session.back(),
        Err(Error::IllegalTransition {
            from: View::Result,
            ..
        })
    ));
    assert!(matches!(
        session.submit_consultation(&gateway).await,
        Err(Error::IllegalTransition { .. })
    ));
}

#[tokio::test]
async fn every_reachable_view_has_valid_flags() {
    let gateway = RecordingGateway::default();
    let mut session = answered([1, 1, 1, 1, 1]);
    assert_eq!(session.flags().view(), Some(View::Survey));
    session.diagnose(&gateway).await.unwrap();
    assert_eq!(session.flags().view(), Some(View::Result));
    session.start_consultation().unwrap();
    assert_eq!(session.flags().view(), Some(View::Consultation));
    fill_consultation(&mut session);
    session.submit_consultation(&gateway).await.unwrap();
    assert_eq!(session.flags().view(), Some(View::Complete));

    // 完了後は診断し直すかリセットしかない
    assert!(session.start_consultation().is_err());
    assert!(matches!(
        session.diagnose(&gateway).await,
        Err(Error::IllegalTransition { .. })
    ));
    session.reset();
    assert_eq!(session.flags().view(), Some(View::Survey));
}
