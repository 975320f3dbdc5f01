pub trait TableShow {
    // 表头
    fn head() -> Vec<&'static str>;

    // 每一行的内容, 列数与表头相同
    fn rows(&self) -> Vec<Vec<String>>;

    fn table(&self) -> String {
        let (head, rows) = (Self::head(), self.rows());
        let mut widths = head.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in rows.iter() {
            for (w, cell) in widths.iter_mut().zip(row.iter()) {
                *w = (*w).max(cell.chars().count());
            }
        }

        fn push_row<'a>(table: &mut String, widths: &[usize], cells: impl Iterator<Item = &'a str>) {
            let line = cells
                .zip(widths.iter())
                .map(|(c, &w)| format!("{c:<w$}"))
                .collect::<Vec<_>>()
                .join("  ");
            table.push_str(line.trim_end());
            table.push('\n');
        }

        let mut table = String::new();
        push_row(&mut table, &widths, head.iter().copied());
        push_row(
            &mut table,
            &widths,
            widths.iter().map(|&w| &"--------------------------------"[..w.min(32)]),
        );
        for row in rows.iter() {
            push_row(&mut table, &widths, row.iter().map(String::as_str));
        }

        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pairs(Vec<(&'static str, usize)>);

    impl TableShow for Pairs {
        fn head() -> Vec<&'static str> {
            vec!["user", "bits"]
        }

        fn rows(&self) -> Vec<Vec<String>> {
            self.0
                .iter()
                .map(|(u, b)| vec![u.to_string(), b.to_string()])
                .collect()
        }
    }

    #[test]
    fn aligned_columns() {
        let t = Pairs(vec![("alice", 512), ("bob", 1024)]).table();
        assert_eq!(
            t,
            "user   bits\n-----  ----\nalice  512\nbob    1024\n"
        );
    }

    #[test]
    fn empty_table() {
        assert_eq!(Pairs(vec![]).table(), "user  bits\n----  ----\n");
    }
}
