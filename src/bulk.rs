use std::io::Read;

use serde::Deserialize;

use crate::{AnswerStore, Error};

/// 一括診断用CSVの1行。ヘッダは `id,q1,q2,q3,q4,q5`。
#[derive(Debug, Deserialize)]
struct BulkRow {
    id: String,
    q1: u8,
    q2: u8,
    q3: u8,
    q4: u8,
    q5: u8,
}

/// CSVを読み、行ごとに回答者IDと回答を返す。
/// 不正な行はその行だけエラーになり、読み込みは続く。
pub fn read_bulk<R: Read>(reader: R) -> impl Iterator<Item = Result<(String, AnswerStore), Error>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .into_deserialize::<BulkRow>()
        .map(|row| {
            let row = row?;
            let store = AnswerStore::from_values(&[row.q1, row.q2, row.q3, row.q4, row.q5])?;
            Ok((row.id, store))
        })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_read_bulk() {
        let input = "id,q1,q2,q3,q4,q5\nalice,5,5,5,5,5\nbob, 1,2,3,4,5\n";
        let rows: Vec<_> = read_bulk(input.as_bytes()).collect();
        assert_eq!(rows.len(), 2);

        let (id, store) = rows[0].as_ref().unwrap();
        assert_eq!(id, "alice");
        assert!(store.is_complete());

        let (id, store) = rows[1].as_ref().unwrap();
        assert_eq!(id, "bob");
        assert_eq!(store.get(5), Some(5));
    }

    #[test]
    fn test_read_bulk_bad_rows() {
        let input = "id,q1,q2,q3,q4,q5\nx,6,1,1,1,1\ny,a,1,1,1,1\nz,1,1,1,1\nw,2,2,2,2,2\n";
        let rows: Vec<_> = read_bulk(input.as_bytes()).collect();
        assert_eq!(rows.len(), 4);
        assert!(matches!(
            rows[0],
            Err(Error::IllegalAnswer { question: 1, value: 6 })
        ));
        assert!(matches!(rows[1], Err(Error::Csv(_))));
        assert!(matches!(rows[2], Err(Error::Csv(_))));
        assert!(rows[3].is_ok());
    }
}
