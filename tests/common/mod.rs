//! Common test utilities for integration tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use subastas_cli::api::ListingApi;
use subastas_cli::browser::{ListingBrowser, Notice};
use subastas_cli::download::FileDownloader;
use subastas_cli::errors::{AppError, AppResult};
use subastas_cli::maps::LinkOpener;
use subastas_cli::models::{ExportRequest, Listing, SearchRequest};
use subastas_cli::ui::Notifier;
use tokio::sync::Notify;

type SearchResponse = (Option<Arc<Notify>>, AppResult<Vec<Listing>>);

/// Scripted [`ListingApi`]: search responses are served in call order, export returns a
/// fixed payload unless told otherwise.
pub struct MockApi {
    search_responses: Mutex<VecDeque<SearchResponse>>,
    export_response: Mutex<Option<AppResult<Vec<u8>>>>,
    export_gate: Option<Arc<Notify>>,
    search_calls: Mutex<Vec<SearchRequest>>,
    export_calls: Mutex<Vec<ExportRequest>>,
}

#[allow(dead_code)]
impl MockApi {
    pub fn new() -> Self {
        Self {
            search_responses: Mutex::new(VecDeque::new()),
            export_response: Mutex::new(None),
            export_gate: None,
            search_calls: Mutex::new(Vec::new()),
            export_calls: Mutex::new(Vec::new()),
        }
    }

    /// Queues a search response.
    pub fn with_search(self, result: AppResult<Vec<Listing>>) -> Self {
        self.search_responses.lock().unwrap().push_back((None, result));
        self
    }

    /// Queues a search response that is only delivered once `gate` is notified.
    pub fn with_gated_search(self, gate: Arc<Notify>, result: AppResult<Vec<Listing>>) -> Self {
        self.search_responses
            .lock()
            .unwrap()
            .push_back((Some(gate), result));
        self
    }

    pub fn with_export(self, result: AppResult<Vec<u8>>) -> Self {
        *self.export_response.lock().unwrap() = Some(result);
        self
    }

    /// Makes every export wait for `gate` before answering.
    pub fn with_export_gate(mut self, gate: Arc<Notify>) -> Self {
        self.export_gate = Some(gate);
        self
    }

    pub fn search_calls(&self) -> Vec<SearchRequest> {
        self.search_calls.lock().unwrap().clone()
    }

    pub fn export_calls(&self) -> Vec<ExportRequest> {
        self.export_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ListingApi for MockApi {
    async fn search(&self, request: &SearchRequest) -> AppResult<Vec<Listing>> {
        self.search_calls.lock().unwrap().push(request.clone());
        let next = self.search_responses.lock().unwrap().pop_front();
        match next {
            Some((gate, result)) => {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                result
            }
            None => Ok(Vec::new()),
        }
    }

    async fn export(&self, request: &ExportRequest) -> AppResult<Vec<u8>> {
        self.export_calls.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.export_gate {
            gate.notified().await;
        }
        self.export_response
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(b"PK\x03\x04xlsx".to_vec()))
    }
}

/// Records every notice.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<Notice> {
        self.notices().into_iter().filter(Notice::is_error).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

/// Keeps saved files in memory.
#[derive(Default)]
pub struct MemoryDownloader {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
    fail: bool,
}

#[allow(dead_code)]
impl MemoryDownloader {
    pub fn failing() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().unwrap().clone()
    }
}

impl FileDownloader for MemoryDownloader {
    fn save(&self, bytes: &[u8], filename: &str) -> AppResult<PathBuf> {
        if self.fail {
            return Err(AppError::Io("disk full".to_string()));
        }
        self.saved
            .lock()
            .unwrap()
            .push((filename.to_string(), bytes.to_vec()));
        Ok(PathBuf::from(filename))
    }
}

/// Records opened links.
#[derive(Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl LinkOpener for RecordingOpener {
    fn open(&self, url: &str) -> AppResult<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// A browser wired to mocks, plus handles on each of them.
pub struct Harness {
    pub browser: ListingBrowser,
    pub api: Arc<MockApi>,
    pub notifier: Arc<RecordingNotifier>,
    pub downloader: Arc<MemoryDownloader>,
    pub opener: Arc<RecordingOpener>,
}

#[allow(dead_code)]
pub fn harness(api: MockApi) -> Harness {
    harness_with_downloader(api, MemoryDownloader::default())
}

#[allow(dead_code)]
pub fn harness_with_downloader(api: MockApi, downloader: MemoryDownloader) -> Harness {
    let api = Arc::new(api);
    let notifier = Arc::new(RecordingNotifier::default());
    let downloader = Arc::new(downloader);
    let opener = Arc::new(RecordingOpener::default());
    let browser = ListingBrowser::new(
        api.clone(),
        downloader.clone(),
        notifier.clone(),
        opener.clone(),
    );
    Harness {
        browser,
        api,
        notifier,
        downloader,
        opener,
    }
}

/// Listing with just an id and an address.
#[allow(dead_code)]
pub fn listing(id: &str) -> Listing {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "titulo": format!("Subasta {id}"),
        "direccion": format!("Calle {id} 1, Madrid"),
    }))
    .unwrap()
}

#[allow(dead_code)]
pub fn listings(ids: &[&str]) -> Vec<Listing> {
    ids.iter().map(|id| listing(id)).collect()
}

/// Search response body as the server sends it, with the legacy field names.
#[allow(dead_code)]
pub const SAMPLE_ENVELOPE: &str = r#"{
  "success": true,
  "total": 2,
  "data": [
    {
      "id": 1,
      "id_subasta": "SUB-2025-001234",
      "titulo": "Vivienda en Madrid Centro",
      "descripcion": "Piso 95m², 3 habitaciones, 2 baños, reformado",
      "tipo": "Inmueble",
      "valor": 250000,
      "pujaMinima": 187500,
      "estado": "Abierta",
      "fechaInicio": "2025-09-15",
      "fechaFin": "2025-10-15",
      "provincia": "Madrid",
      "localidad": "Madrid",
      "direccion": "Calle Gran Vía 45, 28013 Madrid",
      "coordenadas": {"lat": 40.42, "lng": -3.7025},
      "autoridad": "Juzgado Primera Instancia nº 5",
      "lote": "Lote único",
      "imagenes": [
        {"nombre": "fachada.jpg", "url": "https://placehold.co/800x600?text=Madrid"}
      ],
      "documentos": [
        {"nombre": "nota_simple.pdf", "size": "245 KB"}
      ]
    },
    {
      "id": "SUB-JA-2025-77",
      "titulo": "Garaje en Sevilla",
      "tipo_bien": "Inmuebles - Garaje",
      "valor_tasacion": null,
      "provincia": "Sevilla",
      "localidad": "Sevilla",
      "direccion": "Calle Sierpes 3, Sevilla",
      "latitud": 37.39,
      "longitud": -5.99,
      "imagenes": null,
      "documentos": []
    }
  ]
}"#;
