use std::io::{stdin, stdout, Write};

use simple_nutricheck::config::AppConfig;
use simple_nutricheck::consultation::ConsultationField;
use simple_nutricheck::{telemetry, Diagnosis, Error, HttpGateway, Session, View, QUESTIONS};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Error> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let gateway = HttpGateway::new(&config.gateway)?;
    let mut session = Session::new(config.rank_policy);

    loop {
        let keep_going = match session.view() {
            View::Survey => survey(&mut session, &gateway).await?,
            View::Result => result(&mut session)?,
            View::Consultation => consultation(&mut session, &gateway).await?,
            View::Complete => complete(&mut session)?,
        };
        if !keep_going {
            return Ok(());
        }
    }
}

/// 1行読む。入力が終わっていれば `None`。
fn read_line() -> Result<Option<String>, Error> {
    stdout().flush()?;
    let mut buffer = String::new();
    if stdin().read_line(&mut buffer)? == 0 {
        return Ok(None);
    }
    Ok(Some(buffer.trim().to_string()))
}

async fn survey(session: &mut Session, gateway: &HttpGateway) -> Result<bool, Error> {
    println!("あなたの食生活、本当に足りていますか？");
    println!("5つの質問に答えるだけで、今の栄養バランス状態を「見える化」します。");
    println!();

    for question in QUESTIONS.questions() {
        println!("Q{}. {}", question.id, question.title);
        for choice in &question.choices {
            print!("  {} => {}", choice.value, choice.label);
        }
        loop {
            println!();
            let Some(input) = read_line()? else {
                return Ok(false);
            };
            let accepted = input
                .parse::<u8>()
                .map_err(|_| Error::IllegalAnswer {
                    question: question.id,
                    value: 0,
                })
                .and_then(|value| session.answer(question.id, value));
            if accepted.is_ok() {
                break;
            }
            print!("回答は半角数字1〜5で入力してください。");
        }
        println!();
    }

    print!("【任意】その他、食生活のお悩みがあればご記入ください: ");
    let Some(comment) = read_line()? else {
        return Ok(false);
    };
    session.set_free_comment(comment)?;

    println!("診断中...");
    match session.diagnose(gateway).await {
        Ok(_) => Ok(true),
        Err(Error::NotFullfilled) => {
            println!("{}", Error::NotFullfilled);
            Ok(true)
        }
        Err(err) => Err(err),
    }
}

fn print_diagnosis(diagnosis: &Diagnosis) {
    println!("==== あなたの栄養バランス診断結果 ====");
    for point in diagnosis.radar() {
        let filled = usize::from(point.value);
        let empty = usize::from(point.full_mark.saturating_sub(point.value));
        println!(
            "  {:<8} {}{} {}/{}",
            point.subject,
            "■".repeat(filled),
            "□".repeat(empty),
            point.value,
            point.full_mark
        );
    }
    println!();
    println!("総合評価ランク {} (合計 {}点)", diagnosis.rank, diagnosis.total);
    println!("{}", diagnosis.headline);
    println!("{}", diagnosis.body);
    println!();
    println!("◆ {}へのアドバイス", diagnosis.weak_point.short_title);
    println!("特にこの項目のスコアが低めでした。ここを改善することで、体調やパフォーマンスの向上が期待できます。");
    for advice in &diagnosis.advice {
        println!("  ・{}: {}", advice.short_title, advice.text);
    }
    println!();
}

fn result(session: &mut Session) -> Result<bool, Error> {
    if let Some(diagnosis) = session.diagnosis() {
        print_diagnosis(&diagnosis);
    }
    loop {
        println!("1 => 管理栄養士に詳しく相談する  2 => もう一度診断する  q => 終了");
        let Some(input) = read_line()? else {
            return Ok(false);
        };
        match input.as_str() {
            "1" => {
                session.start_consultation()?;
                return Ok(true);
            }
            "2" => {
                session.reset();
                return Ok(true);
            }
            "q" => return Ok(false),
            _ => continue,
        }
    }
}

/// 1項目を入力させる。`b` で結果画面に戻る。
fn fill_field(session: &mut Session, field: ConsultationField) -> Result<Option<bool>, Error> {
    let mark = if field.is_required() { "必須" } else { "任意" };
    println!("{} ({})", field.label(), mark);
    if let Some(options) = field.options() {
        for (index, option) in options.iter().enumerate() {
            print!("  {} => {}", index + 1, option);
        }
        println!();
        if field.is_multi() {
            println!("  複数選択可。カンマ区切りで番号を入力すると選択/解除を切り替えます。");
        }
    }

    let Some(input) = read_line()? else {
        return Ok(None);
    };
    if input == "b" {
        session.back()?;
        return Ok(Some(false));
    }

    let data = session.consultation_mut();
    match field.options() {
        None => {
            data.set(field, input);
        }
        Some(options) => {
            let picked = input
                .split(',')
                .filter_map(|part| part.trim().parse::<usize>().ok())
                .filter_map(|number| number.checked_sub(1).and_then(|i| options.get(i)));
            for option in picked {
                if field.is_multi() {
                    data.toggle(field, option);
                } else {
                    data.set(field, *option);
                }
            }
        }
    }
    Ok(Some(true))
}

async fn consultation(session: &mut Session, gateway: &HttpGateway) -> Result<bool, Error> {
    println!("==== 個別栄養相談 申し込み ====");
    println!("途中で b を入力すると診断結果に戻ります。");
    println!();

    let mut pending: Vec<ConsultationField> = ConsultationField::ALL.to_vec();
    loop {
        for field in pending {
            match fill_field(session, field)? {
                None => return Ok(false),
                Some(false) => return Ok(true),
                Some(true) => {}
            }
        }

        match session.submit_consultation(gateway).await {
            Ok(_) => return Ok(true),
            Err(Error::MissingFields(missing)) => {
                println!("{}", Error::MissingFields(missing.clone()));
                pending = missing;
            }
            Err(Error::Submission(_)) => {
                if let Some(banner) = session.banner() {
                    println!("{banner}");
                }
                println!("r => 再送信する  b => 診断結果に戻る");
                let Some(input) = read_line()? else {
                    return Ok(false);
                };
                if input == "b" {
                    session.back()?;
                    return Ok(true);
                }
                pending = Vec::new();
            }
            Err(err) => return Err(err),
        }
    }
}

fn complete(session: &mut Session) -> Result<bool, Error> {
    println!("送信完了");
    println!("ご回答いただきありがとうございました。");
    println!("Enter => トップに戻る  q => 終了");
    match read_line()? {
        Some(input) if input != "q" => {
            session.reset();
            Ok(true)
        }
        _ => Ok(false),
    }
}
