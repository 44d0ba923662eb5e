//! Storage seam and the background worker that talks to it.
//!
//! The UI thread never blocks on a store: it sends [`Request`]s and picks up
//! [`Response`]s once per frame with [`PersistenceWorker::drain`], then feeds
//! the payloads to a session itself.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::canvas::codec::CanvasStateRecord;
use crate::error::StoreError;
use crate::graph::codec::GraphStateRecord;

/// Backend holding canvas and graph state payloads as JSON text.
pub trait StateStore: Send {
    fn load_canvas_state(&mut self, id: u64) -> Result<String, StoreError>;
    fn save_canvas_state(&mut self, record: &CanvasStateRecord) -> Result<(), StoreError>;
    fn load_graph_state(&mut self, id: u64) -> Result<String, StoreError>;
    /// Stores the record and returns its id, assigning one when `record.id` is `None`.
    fn save_graph_state(&mut self, record: &GraphStateRecord) -> Result<u64, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    canvases: HashMap<u64, String>,
    graphs: HashMap<u64, String>,
    next_graph_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load_canvas_state(&mut self, id: u64) -> Result<String, StoreError> {
        self.canvases
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("canvas {id}")))
    }

    fn save_canvas_state(&mut self, record: &CanvasStateRecord) -> Result<(), StoreError> {
        self.canvases.insert(record.id, record.json.clone());
        Ok(())
    }

    fn load_graph_state(&mut self, id: u64) -> Result<String, StoreError> {
        self.graphs
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("graph {id}")))
    }

    fn save_graph_state(&mut self, record: &GraphStateRecord) -> Result<u64, StoreError> {
        let id = match record.id {
            Some(id) => id,
            None => {
                let highest = self.graphs.keys().copied().max().unwrap_or(0);
                self.next_graph_id = self.next_graph_id.max(highest) + 1;
                self.next_graph_id
            }
        };
        let mut stored = record.clone();
        stored.id = Some(id);
        self.graphs.insert(id, serde_json::to_string(&stored)?);
        Ok(id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    LoadCanvas(u64),
    SaveCanvas(CanvasStateRecord),
    LoadGraph(u64),
    SaveGraph(GraphStateRecord),
}

#[derive(Debug)]
pub enum Response {
    CanvasLoaded {
        id: u64,
        result: Result<String, StoreError>,
    },
    CanvasSaved {
        id: u64,
        result: Result<(), StoreError>,
    },
    GraphLoaded {
        id: u64,
        result: Result<String, StoreError>,
    },
    GraphSaved {
        result: Result<u64, StoreError>,
    },
}

fn serve(store: &mut dyn StateStore, request: Request) -> Response {
    match request {
        Request::LoadCanvas(id) => Response::CanvasLoaded {
            id,
            result: store.load_canvas_state(id),
        },
        Request::SaveCanvas(record) => Response::CanvasSaved {
            id: record.id,
            result: store.save_canvas_state(&record),
        },
        Request::LoadGraph(id) => Response::GraphLoaded {
            id,
            result: store.load_graph_state(id),
        },
        Request::SaveGraph(record) => Response::GraphSaved {
            result: store.save_graph_state(&record),
        },
    }
}

/// Owns a [`StateStore`] on its own thread.
pub struct PersistenceWorker {
    tx: Option<Sender<Request>>,
    rx: Receiver<Response>,
    handle: Option<JoinHandle<()>>,
}

impl PersistenceWorker {
    pub fn spawn<S: StateStore + 'static>(mut store: S) -> Self {
        let (tx, requests) = mpsc::channel::<Request>();
        let (responses, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            for request in requests {
                log::debug!("persistence: {request:?}");
                if responses.send(serve(&mut store, request)).is_err() {
                    break;
                }
            }
            log::debug!("persistence: worker stopped");
        });

        Self {
            tx: Some(tx),
            rx,
            handle: Some(handle),
        }
    }

    pub fn request(&self, request: Request) -> Result<(), StoreError> {
        self.tx
            .as_ref()
            .ok_or(StoreError::WorkerGone)?
            .send(request)
            .map_err(|_| StoreError::WorkerGone)
    }

    /// Responses that arrived since the last call; never blocks.
    pub fn drain(&self) -> Vec<Response> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(response) => out.push(response),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.tx.is_some() {
                        log::warn!("persistence: worker disconnected");
                    }
                    break;
                }
            }
        }
        out
    }

    /// Blocks until the next response; used by tests and shutdown paths.
    pub fn recv(&self) -> Result<Response, StoreError> {
        self.rx.recv().map_err(|_| StoreError::WorkerGone)
    }
}

impl Drop for PersistenceWorker {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("persistence: worker panicked");
            }
        }
    }
}
