use std::fmt::Display;

/// PostgREST row filter and ordering, rendered as query-string pairs.
///
/// ```
/// use pawmatch::supabase::Filter;
///
/// let filter = Filter::new().eq("adopter_id", "a1").order_desc("created_at");
/// assert_eq!(
///     filter.query_pairs(),
///     &[
///         ("adopter_id".to_string(), "eq.a1".to_string()),
///         ("order".to_string(), "created_at.desc".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pairs: Vec<(String, String)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, key: &str, value: String) -> Self {
        self.pairs.push((key.to_string(), value));
        self
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.push(column, format!("eq.{value}"))
    }

    pub fn in_list<V: Display>(self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        let joined = values
            .into_iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.push(column, format!("in.({joined})"))
    }

    pub fn order_desc(self, column: &str) -> Self {
        self.push("order", format!("{column}.desc"))
    }

    pub fn order_asc(self, column: &str) -> Self {
        self.push("order", format!("{column}.asc"))
    }

    pub fn limit(self, n: usize) -> Self {
        self.push("limit", n.to_string())
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}
