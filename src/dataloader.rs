use std::cell::RefCell;
use std::error::Error;
use std::fs::File;

use ndarray::Array;
use serde::Deserialize;

use crate::err::NetError;
use crate::util::{minmax_normalize_params, DataVec, Float};

/// One training example: input vector plus one-hot expected output.
#[derive(Clone, Default)]
pub struct LabeledEntry {
    pub input: DataVec,
    pub expected: DataVec,
}

impl LabeledEntry {
    pub fn new(input: Vec<Float>, expected: Vec<Float>) -> Self {
        Self {
            input: Array::from_vec(input),
            expected: Array::from_vec(expected),
        }
    }
}

/// Expected-output vector with exactly one 1.0 at the class index.
pub fn one_hot(len: usize, index: usize) -> Result<DataVec, NetError> {
    if index >= len {
        return Err(NetError::SizeMismatch {
            expected: len,
            got: index,
        });
    }

    let mut v = DataVec::zeros(len);
    v[index] = 1.0;
    Ok(v)
}

pub trait DataLoader {
    fn next(&self) -> &LabeledEntry;
    fn reset(&mut self);
    fn len(&self) -> Option<usize>;
    fn pos(&self) -> Option<usize>;
}

/// Cycles over an owned list of entries.
pub struct SimpleDataLoader {
    pub id: RefCell<usize>,
    pub data: Vec<LabeledEntry>,
}

impl DataLoader for SimpleDataLoader {
    fn next(&self) -> &LabeledEntry {
        assert!(self.data.len() > 0);

        let mut self_id = self.id.borrow_mut();

        if *self_id < self.data.len() {
            let ret = &self.data[*self_id];
            *self_id += 1;
            return ret;
        } else {
            *self_id = 0;
            drop(self_id);

            return self.next();
        }
    }

    fn reset(&mut self) {
        *self.id.borrow_mut() = 0;
    }

    fn len(&self) -> Option<usize> {
        Some(self.data.len())
    }

    fn pos(&self) -> Option<usize> {
        Some(*self.id.borrow())
    }
}

impl SimpleDataLoader {
    pub fn new(data: Vec<LabeledEntry>) -> Self {
        Self {
            id: RefCell::new(0),
            data,
        }
    }

    pub fn empty() -> Self {
        Self {
            id: RefCell::new(0),
            data: vec![],
        }
    }
}

#[derive(Deserialize)]
struct JsonRecord {
    data: Vec<Float>,
    label: String,
}

/// Loads a JSON dataset of `{ "data": [...], "label": "3" }` records.
/// Raw pixel inputs (0..255) are scaled into [0, 1] and labels one-hot
/// encoded over `classes` entries.
pub fn load_json_dataset(filepath: &str, classes: usize) -> Result<SimpleDataLoader, Box<dyn Error>> {
    let file = File::open(filepath)?;
    let records: Vec<JsonRecord> = serde_json::from_reader(file)?;

    let mut data = Vec::with_capacity(records.len());

    for rec in records {
        let mut input = DataVec::from_vec(rec.data);
        minmax_normalize_params(&mut input, 0.0, 255.0);

        let label: usize = rec.label.parse()?;
        let expected = one_hot(classes, label)?;

        data.push(LabeledEntry { input, expected });
    }

    Ok(SimpleDataLoader::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn one_hot_marks_single_class() {
        let v = one_hot(4, 2).unwrap();
        assert_eq!(v.to_vec(), vec![0.0, 0.0, 1.0, 0.0]);
        assert!(one_hot(4, 4).is_err());
    }

    #[test]
    fn loader_cycles_over_entries() {
        let dl = SimpleDataLoader::new(vec![
            LabeledEntry::new(vec![0.0], vec![1.0]),
            LabeledEntry::new(vec![1.0], vec![0.0]),
        ]);

        assert_eq!(dl.next().input[0], 0.0);
        assert_eq!(dl.next().input[0], 1.0);
        // wraps around
        assert_eq!(dl.next().input[0], 0.0);
    }

    #[test]
    fn json_dataset_is_scaled_and_one_hot() {
        let path = std::env::temp_dir().join("neuromind_dataset_test.json");
        let path_str = path.to_str().unwrap();

        let mut f = File::create(&path).unwrap();
        f.write_all(br#"[{"data": [0.0, 255.0, 51.0], "label": "1"}]"#)
            .unwrap();

        let dl = load_json_dataset(path_str, 3).unwrap();
        let entry = dl.next();

        assert!((entry.input[0] - 0.0).abs() < 1e-12);
        assert!((entry.input[1] - 1.0).abs() < 1e-12);
        assert!((entry.input[2] - 0.2).abs() < 1e-12);
        assert_eq!(entry.expected.to_vec(), vec![0.0, 1.0, 0.0]);
    }
}
