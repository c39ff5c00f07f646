use crate::{
    db::{
        datasource::Datasource,
        response::{Response, Row},
        trace::{QueryTraceEvent, QueryTraceSink},
    },
    error::Error,
    model::SchemaRegistry,
    query::{QueryBuilder, QueryOptions},
};
use serde::Deserialize;

///
/// SearchParams
/// Wire-level search request: filters, sort, grouping, cardinality.
///

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Filter objects, implicitly AND-combined.
    #[serde(default)]
    pub filters: Vec<serde_json::Value>,

    /// Ordered `(sign, path)` pairs; `"+"` ascending, else descending.
    #[serde(default)]
    pub sort: Vec<(String, String)>,

    /// Ordered group-by paths.
    #[serde(default)]
    pub group_by: Vec<String>,

    /// Require exactly one matching row.
    #[serde(default)]
    pub single: bool,
}

///
/// SearchResult
///

#[derive(Debug)]
pub enum SearchResult {
    Many(Response),
    One(Row),
}

///
/// SearchExecutor
///
/// Compiles search parameters and routes them through the datasource.
/// Holds no mutable state; safe to share across concurrent requests.
///

pub struct SearchExecutor<'a, D> {
    schema: &'a SchemaRegistry,
    datasource: &'a D,
    options: QueryOptions,
    debug: bool,
    trace: Option<&'a dyn QueryTraceSink>,
}

impl<'a, D> SearchExecutor<'a, D>
where
    D: Datasource,
{
    #[must_use]
    pub fn new(schema: &'a SchemaRegistry, datasource: &'a D) -> Self {
        Self {
            schema,
            datasource,
            options: QueryOptions::default(),
            debug: false,
            trace: None,
        }
    }

    #[must_use]
    pub const fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub const fn with_trace(mut self, trace: &'a dyn QueryTraceSink) -> Self {
        self.trace = Some(trace);
        self
    }

    fn debug_log(&self, s: impl AsRef<str>) {
        if self.debug {
            println!("[debug] {}", s.as_ref());
        }
    }

    fn emit(&self, event: QueryTraceEvent) {
        if let Some(trace) = self.trace {
            trace.on_event(event);
        }
    }

    /// Run a search, honoring the request's `single` flag.
    pub fn search(&self, entity: &str, params: &SearchParams) -> Result<SearchResult, Error> {
        let response = self.materialize(entity, params)?;

        if params.single {
            return Ok(SearchResult::One(response.one()?));
        }

        Ok(SearchResult::Many(response))
    }

    /// Run a search and return every matching row in query order.
    pub fn search_all(&self, entity: &str, params: &SearchParams) -> Result<Response, Error> {
        self.materialize(entity, params)
    }

    /// Run a search requiring exactly one matching row.
    pub fn search_one(&self, entity: &str, params: &SearchParams) -> Result<Row, Error> {
        Ok(self.materialize(entity, params)?.one()?)
    }

    fn materialize(&self, entity: &str, params: &SearchParams) -> Result<Response, Error> {
        let query = QueryBuilder::new(self.schema)
            .with_options(self.options)
            .create_query(entity, &params.filters, &params.sort, &params.group_by, false)?;
        self.emit(QueryTraceEvent::Compile {
            entity: query.entity,
        });

        let response = self.datasource.execute(self.schema, &query)?;
        self.debug_log(format!(
            "search {} matched {} rows",
            query.entity,
            response.count()
        ));
        self.emit(QueryTraceEvent::Execute {
            entity: query.entity,
            rows: u64::from(response.count()),
        });

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::{SearchExecutor, SearchParams, SearchResult};
    use crate::{
        db::{
            response::ResponseError,
            trace::{QueryTraceEvent, QueryTraceSink},
        },
        error::Error,
        test_fixtures,
        value::Value,
    };
    use std::sync::Mutex;

    fn params(filters: Vec<serde_json::Value>) -> SearchParams {
        SearchParams {
            filters,
            ..SearchParams::default()
        }
    }

    #[test]
    fn search_one_returns_the_single_match() {
        let registry = test_fixtures::registry();
        let ds = test_fixtures::datasource();
        let executor = SearchExecutor::new(&registry, &ds);

        let row = executor
            .search_one(
                "person",
                &params(vec![serde_json::json!({"name": "name", "op": "eq", "val": "Katy"})]),
            )
            .unwrap();

        assert_eq!(row.get("age"), Some(&Value::Int(7)));
    }

    #[test]
    fn search_one_fails_distinctly_on_zero_and_many() {
        let registry = test_fixtures::registry();
        let ds = test_fixtures::datasource();
        let executor = SearchExecutor::new(&registry, &ds);

        let err = executor
            .search_one(
                "person",
                &params(vec![serde_json::json!({"name": "age", "op": "gt", "val": 99})]),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Response(ResponseError::NotFound { .. })
        ));

        let err = executor
            .search_one(
                "person",
                &params(vec![serde_json::json!({"name": "age", "op": "gt", "val": 20})]),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Response(ResponseError::NotUnique { count: 3, .. })
        ));
    }

    #[test]
    fn search_honors_the_single_flag() {
        let registry = test_fixtures::registry();
        let ds = test_fixtures::datasource();
        let executor = SearchExecutor::new(&registry, &ds);

        let mut request = params(vec![
            serde_json::json!({"name": "name", "op": "eq", "val": "John"}),
        ]);
        request.single = true;

        let result = executor.search("person", &request).unwrap();
        assert!(matches!(result, SearchResult::One(_)));

        request.single = false;
        let result = executor.search("person", &request).unwrap();
        assert!(matches!(result, SearchResult::Many(response) if response.count() == 1));
    }

    #[test]
    fn search_all_returns_rows_in_query_order() {
        let registry = test_fixtures::registry();
        let ds = test_fixtures::datasource();
        let executor = SearchExecutor::new(&registry, &ds);

        let response = executor.search_all("person", &SearchParams::default()).unwrap();

        assert_eq!(response.count(), 5);
        assert_eq!(response[0].get("id"), Some(&Value::Int(1)));
    }

    #[test]
    fn trace_sink_sees_compile_and_execute() {
        struct Recorder(Mutex<Vec<QueryTraceEvent>>);

        impl QueryTraceSink for Recorder {
            fn on_event(&self, event: QueryTraceEvent) {
                self.0.lock().unwrap().push(event);
            }
        }

        let registry = test_fixtures::registry();
        let ds = test_fixtures::datasource();
        let recorder = Recorder(Mutex::new(Vec::new()));
        let executor = SearchExecutor::new(&registry, &ds).with_trace(&recorder);

        executor
            .search_all("person", &SearchParams::default())
            .unwrap();

        let events = recorder.0.into_inner().unwrap();
        assert_eq!(
            events,
            vec![
                QueryTraceEvent::Compile { entity: "person" },
                QueryTraceEvent::Execute {
                    entity: "person",
                    rows: 5,
                },
            ]
        );
    }

    #[test]
    fn params_deserialize_from_the_wire_shape() {
        let params: SearchParams = serde_json::from_value(serde_json::json!({
            "filters": [{"name": "age", "op": "ge", "val": 10}],
            "sort": [["-", "age"], ["+", "name"]],
            "group_by": ["name"],
            "single": false,
        }))
        .unwrap();

        assert_eq!(params.filters.len(), 1);
        assert_eq!(params.sort[0], ("-".to_string(), "age".to_string()));
        assert_eq!(params.group_by, vec!["name".to_string()]);
        assert!(!params.single);
    }
}
