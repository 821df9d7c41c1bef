//! 逻辑控制快照
//!
//! 飞行模型只消费逻辑控制位，不关心键盘映射；宿主平台层负责把实际按键
//! 翻译成每帧一份的 [`ControlSnapshot`]。

use bevy_ecs::prelude::*;

/// 每帧一份的逻辑控制快照
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlSnapshot {
    /// 推进键按下
    pub forward: bool,
    /// 向左转向键按下
    pub steer_left: bool,
    /// 向右转向键按下
    pub steer_right: bool,
}

impl ControlSnapshot {
    /// 没有任何按键按下的快照
    pub const RELEASED: Self = Self {
        forward: false,
        steer_left: false,
        steer_right: false,
    };
}
