//! # 异步位图加载
//!
//! 每次请求在独立线程上读取并解码，结果经 channel 送回 UI 线程，
//! 由 UI 线程每帧调用 [`BitmapLoader::poll`] 取出。
//! 请求带递增 id，调用方据此丢弃已被新请求取代的结果；在途的解码不会被取消。

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::core::LoadError;
use crate::core::bitmap::{ImageSource, SourceBitmap};

pub struct LoadOutcome {
    pub request_id: u64,
    pub source: ImageSource,
    pub result: Result<SourceBitmap, LoadError>,
}

pub struct BitmapLoader {
    next_id: u64,
    sender: Sender<LoadOutcome>,
    receiver: Receiver<LoadOutcome>,
    /// 解码完成后唤醒 UI 重绘
    repaint: Option<egui::Context>,
}

impl Default for BitmapLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl BitmapLoader {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            next_id: 1,
            sender,
            receiver,
            repaint: None,
        }
    }

    pub fn with_repaint(mut self, ctx: egui::Context) -> Self {
        self.repaint = Some(ctx);
        self
    }

    /// 发起一次加载，返回请求 id。
    pub fn request(&mut self, source: ImageSource) -> u64 {
        let request_id = self.next_id;
        self.next_id += 1;

        log::info!("开始加载图片 #{request_id}: {}", source.display_name());

        let sender = self.sender.clone();
        let repaint = self.repaint.clone();
        let worker_source = source.clone();
        let spawned = thread::Builder::new()
            .name(format!("lzv-decode-{request_id}"))
            .spawn(move || {
                let result = worker_source.read();
                // 接收端已经销毁说明应用在退出，结果直接丢弃
                let _ = sender.send(LoadOutcome {
                    request_id,
                    source: worker_source,
                    result,
                });
                if let Some(ctx) = repaint {
                    ctx.request_repaint();
                }
            });

        if let Err(error) = spawned {
            let _ = self.sender.send(LoadOutcome {
                request_id,
                source,
                result: Err(LoadError::Worker(error)),
            });
        }

        request_id
    }

    /// 取出所有已完成的结果（不阻塞）
    pub fn poll(&self) -> Vec<LoadOutcome> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::core::bitmap::tests::{png_bytes, split_image};

    fn wait_for(loader: &BitmapLoader, count: usize) -> Vec<LoadOutcome> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut done = Vec::new();
        while done.len() < count && Instant::now() < deadline {
            done.extend(loader.poll());
            thread::sleep(Duration::from_millis(5));
        }
        done
    }

    #[test]
    fn decodes_in_background_and_tags_request() {
        let mut loader = BitmapLoader::new();
        let id = loader.request(ImageSource::Bytes {
            name: "a.png".to_string(),
            bytes: png_bytes(&split_image(100, 50)).into(),
        });

        let outcomes = wait_for(&loader, 1);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].request_id, id);
        assert_eq!(outcomes[0].result.as_ref().unwrap().size(), [100, 50]);
    }

    #[test]
    fn failures_are_delivered_as_results() {
        let mut loader = BitmapLoader::new();
        let first = loader.request(ImageSource::Bytes {
            name: "broken.png".to_string(),
            bytes: b"nope".to_vec().into(),
        });
        let second = loader.request(ImageSource::parse("/nonexistent/lzv/missing.png").unwrap());
        assert!(second > first);

        let mut outcomes = wait_for(&loader, 2);
        outcomes.sort_by_key(|o| o.request_id);
        assert!(matches!(outcomes[0].result, Err(LoadError::Decode(_))));
        assert!(matches!(outcomes[1].result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn poll_without_requests_is_empty() {
        assert!(BitmapLoader::new().poll().is_empty());
    }
}
