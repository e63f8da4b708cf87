//! Script runner
//!
//! A script is a JSON array of requests run in order against one service.
//! String values may refer to ids produced earlier in the run:
//! - `$scene` - the most recently created scene
//! - `$element` - the most recently added element
//! - `$element[N]` - the N-th element added during the run, from zero
//!
//! Exported documents and snapshots are written to the output directory and
//! replaced by their path in the printed response.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use canvas_imaging::ImageFetcher;
use canvas_protocol::{Request, Response, parse_scene_id};
use canvas_scene::CanvasService;
use serde_json::Value;
use tracing::{debug, warn};

/// Ids remembered between requests
#[derive(Debug, Default)]
struct Bindings {
    scene: Option<String>,
    elements: Vec<String>,
}

impl Bindings {
    fn lookup(&self, token: &str) -> Result<Option<String>> {
        if token == "$scene" {
            return self
                .scene
                .clone()
                .map(Some)
                .context("`$scene` used before any scene was created");
        }
        if token == "$element" {
            return self
                .elements
                .last()
                .cloned()
                .map(Some)
                .context("`$element` used before any element was added");
        }
        if let Some(index) = token
            .strip_prefix("$element[")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            let index: usize = index
                .parse()
                .with_context(|| format!("bad element index in {:?}", token))?;
            return self
                .elements
                .get(index)
                .cloned()
                .map(Some)
                .with_context(|| format!("{} refers to element {} but only {} were added", token, index, self.elements.len()));
        }
        Ok(None)
    }

    fn substitute(&self, value: &mut Value) -> Result<()> {
        match value {
            Value::String(text) => {
                if let Some(id) = self.lookup(text)? {
                    *text = id;
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.substitute(item)?;
                }
            }
            Value::Object(map) => {
                for item in map.values_mut() {
                    self.substitute(item)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn record(&mut self, response: &Response) {
        match response {
            Response::SceneCreated { scene_id, .. } => self.scene = Some(scene_id.clone()),
            Response::ElementAdded { element_id } => self.elements.push(element_id.clone()),
            _ => {}
        }
    }
}

/// Outcome of a script run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub requests: usize,
    pub errors: usize,
    pub written: Vec<PathBuf>,
}

pub struct ScriptRunner<'a, F> {
    service: &'a CanvasService<F>,
    out_dir: PathBuf,
    bindings: Bindings,
    summary: RunSummary,
}

impl<'a, F: ImageFetcher> ScriptRunner<'a, F> {
    pub fn new(service: &'a CanvasService<F>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            service,
            out_dir: out_dir.into(),
            bindings: Bindings::default(),
            summary: RunSummary::default(),
        }
    }

    /// Run every request in `script`, calling `emit` with each printable response
    pub async fn run<E>(mut self, script: &str, mut emit: E) -> Result<RunSummary>
    where
        E: FnMut(&Value),
    {
        let steps: Vec<Value> = serde_json::from_str(script).context("script must be a JSON array of requests")?;

        for (index, mut step) in steps.into_iter().enumerate() {
            self.bindings
                .substitute(&mut step)
                .with_context(|| format!("step {}", index + 1))?;
            let request: Request =
                serde_json::from_value(step).with_context(|| format!("step {} is not a valid request", index + 1))?;
            debug!("Step {}: {:?}", index + 1, request);

            let response = self.service.handle(request).await;
            self.summary.requests += 1;
            if let Response::Error { code, message, .. } = &response {
                warn!("Step {} failed with {}: {}", index + 1, code, message);
                self.summary.errors += 1;
            }
            self.bindings.record(&response);
            if let Response::SceneCreated { scene_id, .. } = &response {
                self.watch(scene_id)?;
            }

            let printable = self.persist(response).await?;
            emit(&printable);
        }

        Ok(self.summary)
    }

    /// Log every record change of a newly created scene
    fn watch(&self, scene_id: &str) -> Result<()> {
        let id = parse_scene_id(scene_id)?;
        self.service
            .watch_scene(id, move |event| debug!("Scene {}: {:?}", id, event))?;
        Ok(())
    }

    /// Write binary payloads to disk and return the response to print
    async fn persist(&mut self, response: Response) -> Result<Value> {
        let (payload, file_name) = match &response {
            Response::Document { data, file_name, .. } => (data, self.unique_name(file_name)),
            Response::Snapshot { data } => (data, self.unique_name("snapshot.png")),
            _ => return Ok(serde_json::to_value(&response)?),
        };

        let bytes = STANDARD.decode(payload).context("response payload is not valid base64")?;
        tokio::fs::create_dir_all(&self.out_dir)
            .await
            .with_context(|| format!("failed to create {}", self.out_dir.display()))?;
        let path = self.out_dir.join(file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        let mut value = serde_json::to_value(&response)?;
        if let Some(data) = value.get_mut("data").and_then(Value::as_object_mut) {
            data.insert("data".into(), Value::String(path.display().to_string()));
            data.insert("bytes".into(), Value::from(bytes.len()));
        }
        self.summary.written.push(path);
        Ok(value)
    }

    /// `name`, or `stem-N.ext` if an earlier step already wrote `name`
    fn unique_name(&self, name: &str) -> String {
        let taken = |candidate: &str| self.summary.written.iter().any(|p| p.file_name().is_some_and(|f| f == candidate));
        if !taken(name) {
            return name.to_string();
        }
        let path = Path::new(name);
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
        let ext = path.extension().and_then(|s| s.to_str());
        (2..)
            .map(|n| match ext {
                Some(ext) => format!("{}-{}.{}", stem, n, ext),
                None => format!("{}-{}", stem, n),
            })
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| name.to_string())
    }
}

/// Fail when a script with errors should stop the process
pub fn check(summary: &RunSummary, allow_errors: bool) -> Result<()> {
    if summary.errors > 0 && !allow_errors {
        bail!("{} of {} request(s) failed", summary.errors, summary.requests);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_config::CanvasConfig;
    use canvas_imaging::StaticFetcher;
    use painting::FontBook;
    use serde_json::json;

    fn service() -> CanvasService<StaticFetcher> {
        CanvasService::new(CanvasConfig::default(), StaticFetcher::new(), FontBook::new())
    }

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("canvas-builder-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_substitution() {
        let bindings = Bindings {
            scene: Some("s1".into()),
            elements: vec!["e0".into(), "e1".into()],
        };
        let mut value = json!({
            "sceneId": "$scene",
            "ids": ["$element", "$element[0]", "plain"],
            "n": 3
        });
        bindings.substitute(&mut value).unwrap();
        assert_eq!(
            value,
            json!({ "sceneId": "s1", "ids": ["e1", "e0", "plain"], "n": 3 })
        );

        assert!(bindings.substitute(&mut json!("$element[7]")).is_err());
        assert!(Bindings::default().substitute(&mut json!("$scene")).is_err());
    }

    #[tokio::test]
    async fn test_run_script_writes_document() {
        let service = service();
        let out_dir = scratch_dir("export");
        let script = json!([
            { "type": "CreateScene", "data": { "width": 64, "height": 32 } },
            { "type": "AddElement", "data": { "sceneId": "$scene", "element": { "type": "rectangle", "x": 0, "y": 0, "width": 10, "height": 10, "color": "#ff0000" } } },
            { "type": "AddElement", "data": { "sceneId": "$scene", "element": { "type": "circle", "x": 30, "y": 16, "radius": 8, "isFilled": false } } },
            { "type": "DeleteElement", "data": { "sceneId": "$scene", "elementId": "$element[0]" } },
            { "type": "ExportDocument", "data": { "sceneId": "$scene" } },
            { "type": "AddElement", "data": { "sceneId": "$scene", "element": { "type": "rectangle", "x": 0, "y": 0, "width": 1, "height": 1 } } }
        ])
        .to_string();

        let mut printed = Vec::new();
        let summary = ScriptRunner::new(&service, &out_dir)
            .run(&script, |value| printed.push(value.clone()))
            .await
            .unwrap();

        assert_eq!(summary.requests, 6);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.written, vec![out_dir.join("canvas.pdf")]);
        assert!(std::fs::read(out_dir.join("canvas.pdf")).unwrap().starts_with(b"%PDF"));
        assert_eq!(printed[4]["type"], "Document");
        assert_eq!(printed[5]["data"]["code"], "not_found");
        assert!(check(&summary, true).is_ok());
        assert!(check(&summary, false).is_err());

        std::fs::remove_dir_all(&out_dir).ok();
    }

    #[tokio::test]
    async fn test_repeated_outputs_get_unique_names() {
        let service = service();
        let out_dir = scratch_dir("snapshots");
        let script = json!([
            { "type": "CreateScene", "data": { "width": 4, "height": 4 } },
            { "type": "SnapshotPng", "data": { "sceneId": "$scene" } },
            { "type": "SnapshotPng", "data": { "sceneId": "$scene" } }
        ])
        .to_string();

        let summary = ScriptRunner::new(&service, &out_dir)
            .run(&script, |_| {})
            .await
            .unwrap();
        assert_eq!(
            summary.written,
            vec![out_dir.join("snapshot.png"), out_dir.join("snapshot-2.png")]
        );

        std::fs::remove_dir_all(&out_dir).ok();
    }

    #[tokio::test]
    async fn test_invalid_script() {
        let service = service();
        let err = ScriptRunner::new(&service, scratch_dir("invalid"))
            .run(r#"{"type":"CreateScene"}"#, |_| {})
            .await
            .unwrap_err();
        assert!(err.to_string().contains("JSON array"));
    }
}
