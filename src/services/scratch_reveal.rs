//! 刮刮卡揭晓判定
//!
//! 遮罩按 `sample_stride` 像素间距的网格采样。圆形橡皮擦在按下点以及每段拖动线段上
//! 连续描点，快速滑动也会留下连续的刮痕。已刮比例超过阈值时切换为 `Revealed`，
//! 且只通知一次。

use crate::config::ScratchConfig;
use crate::models::{AssignedPrize, Order, OrderEvent, OrderStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Active,
    Revealed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealEvent {
    pub cleared_fraction: f64,
}

#[derive(Debug, Clone)]
pub struct ScratchRevealDetector {
    width: f64,
    height: f64,
    brush_radius: f64,
    stride: f64,
    threshold: f64,
    cols: usize,
    rows: usize,
    cleared: Vec<bool>,
    cleared_count: usize,
    last_point: Option<(f64, f64)>,
    state: RevealState,
}

impl ScratchRevealDetector {
    pub fn new(width: u32, height: u32, brush_radius: u32, sample_stride: u32, threshold: f64) -> Self {
        let stride = sample_stride.max(1);
        let cols = width.div_ceil(stride).max(1) as usize;
        let rows = height.div_ceil(stride).max(1) as usize;
        Self {
            width: f64::from(width),
            height: f64::from(height),
            brush_radius: f64::from(brush_radius),
            stride: f64::from(stride),
            threshold,
            cols,
            rows,
            cleared: vec![false; cols * rows],
            cleared_count: 0,
            last_point: None,
            state: RevealState::Active,
        }
    }

    pub fn from_config(config: &ScratchConfig) -> Self {
        Self::new(
            config.width,
            config.height,
            config.brush_radius,
            config.sample_stride,
            config.reveal_threshold,
        )
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn cleared_fraction(&self) -> f64 {
        self.cleared_count as f64 / self.cleared.len() as f64
    }

    /// 非有限坐标忽略
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        self.last_point = Some((x, y));
        self.stamp(x, y);
    }

    /// 未按下时的移动（悬停）不擦除；非有限坐标忽略
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<RevealEvent> {
        let (x0, y0) = self.last_point?;
        if !(x.is_finite() && y.is_finite()) {
            return None;
        }
        if let Some((from, to)) = self.clip((x0, y0), (x, y)) {
            self.stroke(from, to);
        }
        self.last_point = Some((x, y));
        self.check()
    }

    pub fn pointer_up(&mut self) -> Option<RevealEvent> {
        self.last_point = None;
        self.check()
    }

    fn check(&mut self) -> Option<RevealEvent> {
        if self.state == RevealState::Revealed {
            return None;
        }
        let fraction = self.cleared_fraction();
        if fraction > self.threshold {
            self.state = RevealState::Revealed;
            return Some(RevealEvent {
                cleared_fraction: fraction,
            });
        }
        None
    }

    fn stroke(&mut self, from: (f64, f64), to: (f64, f64)) {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let distance = dx.hypot(dy);
        let spacing = (self.brush_radius / 2.0).max(1.0);
        let steps = (distance / spacing).ceil().max(1.0) as usize;
        for k in 1..=steps {
            let t = k as f64 / steps as f64;
            self.stamp(from.0 + dx * t, from.1 + dy * t);
        }
    }

    /// 将线段裁剪到外扩 brush_radius 的画面矩形内（Liang-Barsky），
    /// 线段完全在外时返回 None。裁剪后长度有界，描点次数随之有界。
    fn clip(&self, from: (f64, f64), to: (f64, f64)) -> Option<((f64, f64), (f64, f64))> {
        let r = self.brush_radius;
        let (min_x, max_x) = (-r, self.width + r);
        let (min_y, max_y) = (-r, self.height + r);
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);

        let mut t0 = 0.0_f64;
        let mut t1 = 1.0_f64;
        for (p, q) in [
            (-dx, from.0 - min_x),
            (dx, max_x - from.0),
            (-dy, from.1 - min_y),
            (dy, max_y - from.1),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
            if t0 > t1 {
                return None;
            }
        }

        Some((
            (from.0 + dx * t0, from.1 + dy * t0),
            (from.0 + dx * t1, from.1 + dy * t1),
        ))
    }

    fn stamp(&mut self, cx: f64, cy: f64) {
        let r = self.brush_radius;
        let Some((c0, c1)) = self.index_range(cx, r, self.cols) else {
            return;
        };
        let Some((r0, r1)) = self.index_range(cy, r, self.rows) else {
            return;
        };
        for row in r0..=r1 {
            let sy = row as f64 * self.stride;
            for col in c0..=c1 {
                let sx = col as f64 * self.stride;
                let idx = row * self.cols + col;
                if !self.cleared[idx] && (sx - cx).powi(2) + (sy - cy).powi(2) <= r * r {
                    self.cleared[idx] = true;
                    self.cleared_count += 1;
                }
            }
        }
    }

    /// 圆心 c、半径 r 覆盖的采样下标区间（越界裁剪）
    fn index_range(&self, c: f64, r: f64, len: usize) -> Option<(usize, usize)> {
        let lo = ((c - r) / self.stride).ceil().max(0.0);
        let hi = ((c + r) / self.stride).floor().min((len - 1) as f64);
        if lo > hi {
            return None;
        }
        Some((lo as usize, hi as usize))
    }
}

/// 将刮刮卡与订单阶段绑定：揭晓时推进到 Revealed
///
/// 奖品在登记时已确定，这里只决定何时可以展示。
#[derive(Debug, Clone)]
pub struct ScratchSession {
    order_id: String,
    prize: AssignedPrize,
    stage: OrderStage,
    detector: ScratchRevealDetector,
}

impl ScratchSession {
    pub fn new(order: &Order, detector: ScratchRevealDetector) -> Self {
        Self {
            order_id: order.id.clone(),
            prize: order.assigned_prize(),
            stage: order.stage(),
            detector,
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn stage(&self) -> OrderStage {
        self.stage
    }

    pub fn detector(&self) -> &ScratchRevealDetector {
        &self.detector
    }

    /// 揭晓前不返回奖品
    pub fn revealed_prize(&self) -> Option<&AssignedPrize> {
        (self.detector.state() == RevealState::Revealed).then_some(&self.prize)
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.detector.pointer_down(x, y);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<RevealEvent> {
        let event = self.detector.pointer_move(x, y);
        self.on_event(event)
    }

    pub fn pointer_up(&mut self) -> Option<RevealEvent> {
        let event = self.detector.pointer_up();
        self.on_event(event)
    }

    fn on_event(&mut self, event: Option<RevealEvent>) -> Option<RevealEvent> {
        if event.is_some() {
            // PrizeDetermined / Revealed / Redeemed 接受 Revealed 事件
            if let Ok(next) = self.stage.apply(OrderEvent::Revealed) {
                self.stage = next;
            }
        }
        event
    }
}
