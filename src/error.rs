use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("could not create canvas: {0}")]
    CanvasCreation(String),
    #[error("2d rendering context unavailable")]
    ContextUnavailable,
    #[error("could not attach canvas to host element: {0}")]
    Attach(String),
    #[error("invalid data-rocket-config: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

impl SceneError {
    pub fn canvas(err: wasm_bindgen::JsValue) -> Self {
        SceneError::CanvasCreation(format!("{:?}", err))
    }

    pub fn attach(err: wasm_bindgen::JsValue) -> Self {
        SceneError::Attach(format!("{:?}", err))
    }
}
