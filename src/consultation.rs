//! 個別栄養相談の申し込みフォーム

pub const AGE_OPTIONS: &[&str] = &["20代", "30代", "40代", "50代", "60代以上"];
pub const GENDER_OPTIONS: &[&str] = &["男性", "女性", "回答しない"];
pub const LIVING_SITUATION_OPTIONS: &[&str] = &[
    "一人暮らし",
    "実家暮らし",
    "配偶者と同居",
    "子供と同居",
    "シェアハウス",
    "その他",
];
pub const MEAL_COUNT_OPTIONS: &[&str] = &["1回", "2回", "3回", "4回以上"];
pub const EATING_OUT_OPTIONS: &[&str] = &["ほとんどなし", "週1～2回", "週3～4回", "ほぼ毎日"];
pub const SYMPTOM_OPTIONS: &[&str] = &[
    "特になし",
    "便秘",
    "貧血",
    "食欲不振",
    "むくみ",
    "疲れやすい",
    "その他",
];
pub const EXERCISE_OPTIONS: &[&str] = &["なし", "週1～2回", "週3回以上"];
pub const PURPOSE_OPTIONS: &[&str] = &[
    "ダイエット",
    "筋肉をつけたい",
    "体調改善",
    "食習慣を変えたい",
    "その他",
];
pub const EXPERIENCE_OPTIONS: &[&str] = &["初めて", "受けたことがある"];

/// 複数選択の値を送信用に連結する区切り
pub const LIST_SEPARATOR: &str = ", ";

/// フォームの入力項目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsultationField {
    Name,
    Age,
    Gender,
    Email,
    LivingSituation,
    MealCount,
    EatingOutFrequency,
    MedicalHistory,
    Symptoms,
    ExerciseHabits,
    ConsultationPurpose,
    ConsultationExperience,
    Content,
}

impl ConsultationField {
    /// 画面・送信の並び順
    pub const ALL: [ConsultationField; 13] = [
        ConsultationField::Name,
        ConsultationField::Age,
        ConsultationField::Gender,
        ConsultationField::Email,
        ConsultationField::LivingSituation,
        ConsultationField::MealCount,
        ConsultationField::EatingOutFrequency,
        ConsultationField::MedicalHistory,
        ConsultationField::Symptoms,
        ConsultationField::ExerciseHabits,
        ConsultationField::ConsultationPurpose,
        ConsultationField::ConsultationExperience,
        ConsultationField::Content,
    ];

    /// 送信ペイロードのキー
    pub fn key(&self) -> &'static str {
        match self {
            ConsultationField::Name => "name",
            ConsultationField::Age => "age",
            ConsultationField::Gender => "gender",
            ConsultationField::Email => "email",
            ConsultationField::LivingSituation => "livingSituation",
            ConsultationField::MealCount => "mealCount",
            ConsultationField::EatingOutFrequency => "eatingOutFrequency",
            ConsultationField::MedicalHistory => "medicalHistory",
            ConsultationField::Symptoms => "symptoms",
            ConsultationField::ExerciseHabits => "exerciseHabits",
            ConsultationField::ConsultationPurpose => "consultationPurpose",
            ConsultationField::ConsultationExperience => "consultationExperience",
            ConsultationField::Content => "content",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConsultationField::Name => "氏名",
            ConsultationField::Age => "年齢",
            ConsultationField::Gender => "性別",
            ConsultationField::Email => "メールアドレス",
            ConsultationField::LivingSituation => "居住形態",
            ConsultationField::MealCount => "1日の食事回数",
            ConsultationField::EatingOutFrequency => "外食・コンビニの利用頻度",
            ConsultationField::MedicalHistory => "持病や既往歴",
            ConsultationField::Symptoms => "現在の体調や気になる症状",
            ConsultationField::ExerciseHabits => "運動習慣",
            ConsultationField::ConsultationPurpose => "栄養相談を受ける目的",
            ConsultationField::ConsultationExperience => "栄養相談の経験",
            ConsultationField::Content => "詳しい相談内容",
        }
    }

    /// 選択式の項目なら選択肢を返す。自由記述なら `None`。
    pub fn options(&self) -> Option<&'static [&'static str]> {
        match self {
            ConsultationField::Age => Some(AGE_OPTIONS),
            ConsultationField::Gender => Some(GENDER_OPTIONS),
            ConsultationField::LivingSituation => Some(LIVING_SITUATION_OPTIONS),
            ConsultationField::MealCount => Some(MEAL_COUNT_OPTIONS),
            ConsultationField::EatingOutFrequency => Some(EATING_OUT_OPTIONS),
            ConsultationField::Symptoms => Some(SYMPTOM_OPTIONS),
            ConsultationField::ExerciseHabits => Some(EXERCISE_OPTIONS),
            ConsultationField::ConsultationPurpose => Some(PURPOSE_OPTIONS),
            ConsultationField::ConsultationExperience => Some(EXPERIENCE_OPTIONS),
            ConsultationField::Name
            | ConsultationField::Email
            | ConsultationField::MedicalHistory
            | ConsultationField::Content => None,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(
            self,
            ConsultationField::Symptoms | ConsultationField::ConsultationPurpose
        )
    }

    /// 既往歴だけが任意
    pub fn is_required(&self) -> bool {
        !matches!(self, ConsultationField::MedicalHistory)
    }
}

pub(crate) fn join_labels(fields: &[ConsultationField]) -> String {
    fields
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join("、")
}

/// 相談フォームの入力内容。すべて空で始まり、項目ごとに更新される。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsultationData {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub email: String,
    pub living_situation: String,
    pub meal_count: String,
    pub eating_out_frequency: String,
    pub medical_history: String,
    pub symptoms: Vec<String>,
    pub exercise_habits: String,
    pub consultation_purpose: Vec<String>,
    pub consultation_experience: String,
    pub content: String,
}

impl ConsultationData {
    fn text_mut(&mut self, field: ConsultationField) -> Option<&mut String> {
        match field {
            ConsultationField::Name => Some(&mut self.name),
            ConsultationField::Age => Some(&mut self.age),
            ConsultationField::Gender => Some(&mut self.gender),
            ConsultationField::Email => Some(&mut self.email),
            ConsultationField::LivingSituation => Some(&mut self.living_situation),
            ConsultationField::MealCount => Some(&mut self.meal_count),
            ConsultationField::EatingOutFrequency => Some(&mut self.eating_out_frequency),
            ConsultationField::MedicalHistory => Some(&mut self.medical_history),
            ConsultationField::ExerciseHabits => Some(&mut self.exercise_habits),
            ConsultationField::ConsultationExperience => Some(&mut self.consultation_experience),
            ConsultationField::Content => Some(&mut self.content),
            ConsultationField::Symptoms | ConsultationField::ConsultationPurpose => None,
        }
    }

    fn list_mut(&mut self, field: ConsultationField) -> Option<&mut Vec<String>> {
        match field {
            ConsultationField::Symptoms => Some(&mut self.symptoms),
            ConsultationField::ConsultationPurpose => Some(&mut self.consultation_purpose),
            _ => None,
        }
    }

    /// 単一値の項目を上書きする。複数選択の項目には何もせず `false` を返す。
    pub fn set(&mut self, field: ConsultationField, value: impl Into<String>) -> bool {
        match self.text_mut(field) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// 複数選択の項目で値の有無を切り替える。選択済みなら外し、未選択なら末尾に加える。
    /// 単一値の項目には何もせず `false` を返す。
    pub fn toggle(&mut self, field: ConsultationField, value: &str) -> bool {
        let Some(list) = self.list_mut(field) else {
            return false;
        };
        if let Some(position) = list.iter().position(|item| item == value) {
            list.remove(position);
        } else {
            list.push(value.to_string());
        }
        true
    }

    /// 送信用の値。複数選択は区切り文字で連結する。
    pub fn value(&self, field: ConsultationField) -> String {
        match field {
            ConsultationField::Name => self.name.clone(),
            ConsultationField::Age => self.age.clone(),
            ConsultationField::Gender => self.gender.clone(),
            ConsultationField::Email => self.email.clone(),
            ConsultationField::LivingSituation => self.living_situation.clone(),
            ConsultationField::MealCount => self.meal_count.clone(),
            ConsultationField::EatingOutFrequency => self.eating_out_frequency.clone(),
            ConsultationField::MedicalHistory => self.medical_history.clone(),
            ConsultationField::Symptoms => self.symptoms.join(LIST_SEPARATOR),
            ConsultationField::ExerciseHabits => self.exercise_habits.clone(),
            ConsultationField::ConsultationPurpose => {
                self.consultation_purpose.join(LIST_SEPARATOR)
            }
            ConsultationField::ConsultationExperience => self.consultation_experience.clone(),
            ConsultationField::Content => self.content.clone(),
        }
    }

    /// 未入力の必須項目を画面の並び順で返す
    pub fn missing_fields(&self) -> Vec<ConsultationField> {
        ConsultationField::ALL
            .into_iter()
            .filter(|field| field.is_required() && self.value(*field).trim().is_empty())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
