use clap::Parser;
use simple_nutricheck::config::AppConfig;
use simple_nutricheck::{read_bulk, telemetry, Error, RankPolicy};
use std::fs::File;
use std::io::BufReader;
use tracing::warn;

/// 回答CSV (`id,q1,q2,q3,q4,q5`) を一括で診断する
#[derive(Parser)]
struct Args {
    path: String,
    /// 1行1件のJSONで出力する
    #[arg(long)]
    json: bool,
    /// D ランクを含む4段階で判定する (既定は設定値)
    #[arg(long)]
    four_tier: bool,
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let policy = if args.four_tier {
        RankPolicy::four_tier()
    } else {
        config.rank_policy
    };

    let reader = BufReader::new(File::open(&args.path)?);
    for row in read_bulk(reader) {
        match row {
            Ok((id, store)) => match store.to_diagnosis(&policy) {
                Ok(diagnosis) if args.json => {
                    let line = serde_json::json!({ "id": id, "diagnosis": diagnosis });
                    println!("{line}");
                }
                Ok(diagnosis) => {
                    println!(
                        "id = {}, total = {}, rank = {}, weak_point = {}, advice = {}",
                        id,
                        diagnosis.total,
                        diagnosis.rank,
                        diagnosis.weak_point.short_title,
                        diagnosis.advice.len()
                    );
                }
                Err(e) => warn!(%id, error = %e, "row could not be diagnosed"),
            },
            Err(e) => warn!(error = %e, "skipping unreadable row"),
        }
    }
    Ok(())
}
