use ndarray::{Array1, Zip};

pub type Float = f64;
pub type DataVec = Array1<Float>;

/// With minmax normalising values will be between 0..1
pub fn minmax_normalize(data: &mut DataVec) {
    let min = data.fold(Float::MAX, |val_min, val| {
        if *val < val_min {
            return *val;
        } else {
            return val_min;
        }
    });

    let max = data.fold(Float::MIN, |val_max, val| {
        if *val > val_max {
            return *val;
        } else {
            return val_max;
        }
    });

    minmax_normalize_params(data, min, max);
}

pub fn minmax_normalize_val(val: Float, min: Float, max: Float) -> Float {
    (val - min) / (max - min)
}

pub fn minmax_normalize_params(data: &mut DataVec, min: Float, max: Float) {
    Zip::from(data).for_each(|el| {
        *el = minmax_normalize_val(*el, min, max);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn minmax_maps_range_to_unit_interval() {
        let mut data: DataVec = array![0.0, 127.5, 255.0];
        minmax_normalize(&mut data);

        assert!((data[0] - 0.0).abs() < 1e-12);
        assert!((data[1] - 0.5).abs() < 1e-12);
        assert!((data[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn minmax_with_explicit_params() {
        let mut data: DataVec = array![255.0, 0.0, 51.0];
        minmax_normalize_params(&mut data, 0.0, 255.0);

        assert!((data[0] - 1.0).abs() < 1e-12);
        assert!((data[1] - 0.0).abs() < 1e-12);
        assert!((data[2] - 0.2).abs() < 1e-12);
    }
}
