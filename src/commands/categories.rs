use crate::args::CategoriesArgs;
use crate::commands::Out;
use crate::model::{CategoryRecord, Group, ITEMS};
use crate::{source, Config, Result};
use std::fmt::Write;

/// Loads and cleans the CPI table and lists it, main categories only unless `--all` is given.
pub async fn categories(config: Config, args: &CategoriesArgs) -> Result<Out<Vec<CategoryRecord>>> {
    let kind = args.source().unwrap_or_else(|| config.source());
    let table = source::load_cpi_table(&config, kind).await?;
    let records: Vec<CategoryRecord> = table
        .records()
        .iter()
        .filter(|r| args.all() || r.group() == Group::Main)
        .cloned()
        .collect();
    Ok(Out::new(format_records(&records), records))
}

fn format_records(records: &[CategoryRecord]) -> String {
    let width = records
        .iter()
        .map(|r| r.name().len())
        .chain(std::iter::once(ITEMS.len()))
        .max()
        .unwrap_or_default();
    let mut s = format!("\n{ITEMS:<width$}  group  {:>8}  {:>6}\n", "latest", "diff");
    for r in records {
        let _ = writeln!(
            s,
            "{:<width$}  {:<5}  {:>8}  {:>6}",
            r.name(),
            r.group().to_string(),
            fmt_price(r.latest_price()),
            fmt_price(r.price_diff()),
        );
    }
    s
}

fn fmt_price(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_categories_main_only() {
        let env = TestEnv::new().await;
        let out = categories(env.config(), &CategoriesArgs::new(None, false))
            .await
            .unwrap();
        let records = out.structure().unwrap();
        assert_eq!(records.len(), 10);
        assert!(out.message().contains("Recreation & Culture"));
        assert!(out.message().contains("121.5"));
        assert!(!out.message().contains("Sub Item"));
    }

    #[tokio::test]
    async fn test_categories_all() {
        let env = TestEnv::new().await;
        let out = categories(env.config(), &CategoriesArgs::new(None, true))
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().len(), 152);
        assert!(out.message().contains("Sub Item 20"));
    }

    #[test]
    fn test_format_records() {
        let records = vec![
            CategoryRecord::new("Food", Some(121.46), Some(100.0)),
            CategoryRecord::new("Rice", Some(99.0), None),
        ];
        let s = format_records(&records);
        assert!(s.contains("Food   Main      121.5    21.5"));
        assert!(s.contains("Rice   Sub        99.0       -"));
    }
}
