use crate::common_io::{read_lines, write_lines};
use crate::traits::IoOps;
use ndarray::parallel::prelude::*;
use ndarray::prelude::*;
use std::fmt::{Debug, Display};
use std::str::FromStr;

impl<T> IoOps for Array2<T>
where
    T: FromStr + Send + Sync + Display,
    <T as FromStr>::Err: Debug,
{
    type Mat = Self;

    fn from_tsv(tsv_file: &str) -> anyhow::Result<Self::Mat> {
        let lines = read_lines(tsv_file)?;

        let rows = lines
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                line.split('\t')
                    .map(|w| {
                        w.parse::<T>()
                            .map_err(|e| anyhow::anyhow!("failed to parse {}: {:?}", w, e))
                    })
                    .collect::<anyhow::Result<Vec<T>>>()
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        if rows.is_empty() {
            return Err(anyhow::anyhow!("No data in file"));
        }

        let nrows = rows.len();
        let ncols = rows[0].len();

        if rows.iter().any(|r| r.len() != ncols) {
            return Err(anyhow::anyhow!("ragged rows in {}", tsv_file));
        }

        let data = rows.into_iter().flatten().collect::<Vec<_>>();
        Ok(Array2::from_shape_vec((nrows, ncols), data)?)
    }

    fn to_tsv(&self, tsv_file: &str) -> anyhow::Result<()> {
        let lines: Vec<Box<str>> = self
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|row| {
                row.iter()
                    .map(|x| format!("{}", *x))
                    .collect::<Vec<String>>()
                    .join("\t")
                    .into_boxed_str()
            })
            .collect();
        write_lines(&lines, tsv_file)?;
        Ok(())
    }
}

impl<T> IoOps for Array1<T>
where
    T: FromStr + Display,
    <T as FromStr>::Err: Debug,
{
    type Mat = Self;

    fn from_tsv(tsv_file: &str) -> anyhow::Result<Self::Mat> {
        let data = read_lines(tsv_file)?
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|w| {
                w.trim()
                    .parse::<T>()
                    .map_err(|e| anyhow::anyhow!("failed to parse {}: {:?}", w, e))
            })
            .collect::<anyhow::Result<Vec<T>>>()?;
        Ok(Array1::from_vec(data))
    }

    fn to_tsv(&self, tsv_file: &str) -> anyhow::Result<()> {
        let lines: Vec<Box<str>> = self
            .iter()
            .map(|x| format!("{}", x).into_boxed_str())
            .collect();
        write_lines(&lines, tsv_file)
    }
}
