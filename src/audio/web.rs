//! Web Audio API backend
//!
//! Buffers are fetched and decoded asynchronously; finished decodes land in an
//! inbox the frame loop drains with [`WebAudio::take_decoded`]. Every voice is
//! an `AudioBufferSourceNode` routed through an HRTF `PannerNode`.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use js_sys::ArrayBuffer;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AudioBuffer, AudioBufferSourceNode, AudioContext, DistanceModelType, GainNode, PannerNode,
    PanningModelType, Response,
};

use super::{AudioError, AudioSpatializer, LoadTicket, SoundId};

// Panner parameters
const REF_DISTANCE: f64 = 1.0;
const MAX_DISTANCE: f64 = 100.0;
const ROLLOFF_FACTOR: f64 = 1.0;

/// A finished decode waiting to be handed to the game
pub struct Decoded {
    pub ticket: LoadTicket,
    pub id: SoundId,
    pub buffer: AudioBuffer,
}

/// Playing source and its panner
pub struct WebVoice {
    source: AudioBufferSourceNode,
    panner: PannerNode,
}

pub struct WebAudio {
    ctx: AudioContext,
    master: GainNode,
    inbox: Rc<RefCell<Vec<Decoded>>>,
}

fn js_err(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

impl WebAudio {
    pub fn new() -> Result<Self, AudioError> {
        let ctx = AudioContext::new().map_err(|e| AudioError::Unavailable(js_err(e)))?;
        let master = ctx
            .create_gain()
            .map_err(|e| AudioError::Unavailable(js_err(e)))?;
        master
            .connect_with_audio_node(&ctx.destination())
            .map_err(|e| AudioError::Unavailable(js_err(e)))?;

        Ok(Self {
            ctx,
            master,
            inbox: Rc::new(RefCell::new(Vec::new())),
        })
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if self.ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = self.ctx.resume();
        }
    }

    /// Drain decodes that finished since the last call
    pub fn take_decoded(&self) -> Vec<Decoded> {
        std::mem::take(&mut *self.inbox.borrow_mut())
    }

    fn create_panner(&self, position: Vec3) -> Result<PannerNode, JsValue> {
        let panner = self.ctx.create_panner()?;
        panner.set_panning_model(PanningModelType::Hrtf);
        panner.set_distance_model(DistanceModelType::Exponential);
        panner.set_ref_distance(REF_DISTANCE);
        panner.set_max_distance(MAX_DISTANCE);
        panner.set_rolloff_factor(ROLLOFF_FACTOR);
        panner.set_position(position.x as f64, position.y as f64, position.z as f64);
        panner.connect_with_audio_node(&self.master)?;
        Ok(panner)
    }

    fn start_voice(&self, buffer: &AudioBuffer, position: Vec3, looped: bool) -> Result<WebVoice, JsValue> {
        let panner = self.create_panner(position)?;
        let source = self.ctx.create_buffer_source()?;
        source.set_buffer(Some(buffer));
        source.set_loop(looped);
        source.connect_with_audio_node(&panner)?;
        source.start()?;
        Ok(WebVoice { source, panner })
    }
}

async fn fetch_and_decode(ctx: AudioContext, path: &str) -> Result<AudioBuffer, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let response: Response = JsFuture::from(window.fetch_with_str(path)).await?.dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!("HTTP {}", response.status())));
    }
    let bytes: ArrayBuffer = JsFuture::from(response.array_buffer()?).await?.dyn_into()?;
    let buffer = JsFuture::from(ctx.decode_audio_data(&bytes)?).await?;
    buffer.dyn_into()
}

impl AudioSpatializer for WebAudio {
    type Buffer = AudioBuffer;
    type Voice = WebVoice;

    fn request_decode(&mut self, id: SoundId, ticket: LoadTicket) -> Result<(), AudioError> {
        let ctx = self.ctx.clone();
        let inbox = Rc::clone(&self.inbox);
        let path = id.asset_path();

        wasm_bindgen_futures::spawn_local(async move {
            match fetch_and_decode(ctx, path).await {
                Ok(buffer) => inbox.borrow_mut().push(Decoded { ticket, id, buffer }),
                Err(e) => log::warn!(
                    "{}",
                    AudioError::Decode {
                        path,
                        reason: js_err(e)
                    }
                ),
            }
        });
        Ok(())
    }

    fn start(&mut self, buffer: &AudioBuffer, position: Vec3, looped: bool) -> Result<WebVoice, AudioError> {
        self.resume();
        self.start_voice(buffer, position, looped)
            .map_err(|e| AudioError::Playback(js_err(e)))
    }

    fn move_voice(&mut self, voice: &WebVoice, position: Vec3) {
        voice
            .panner
            .set_position(position.x as f64, position.y as f64, position.z as f64);
    }

    fn stop(&mut self, voice: WebVoice) {
        let _ = voice.source.stop();
        voice.source.disconnect().ok();
        voice.panner.disconnect().ok();
    }

    fn set_listener(&mut self, position: Vec3, forward: Vec3) {
        let listener = self.ctx.listener();
        listener.set_position(position.x as f64, position.y as f64, position.z as f64);
        listener.set_orientation(
            forward.x as f64,
            forward.y as f64,
            forward.z as f64,
            0.0,
            1.0,
            0.0,
        );
    }

    fn set_volume(&mut self, volume: f32) {
        self.master.gain().set_value(volume.clamp(0.0, 1.0));
    }
}
