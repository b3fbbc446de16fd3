//! 定位器轴系
//!
//! 定位器最多有 6 个轴：三个角度轴（AZ 方位、EL 俯仰、POL 极化）和三个线性轴（X、Y、V）。
//! 步长、限位、方向向量都是"每轴一个值"的结构，统一用 [`AxisMap`] 表示。

use crate::error::DeviceError;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;
use std::ops::{Index, IndexMut};

/// 定位器轴
///
/// 判定顺序即声明顺序：开环运动的限位检查按 AZ → EL → POL → X → Y → V 依次进行，
/// 第一个越界的轴决定停止原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
#[repr(u8)]
pub enum Axis {
    /// 方位（度）
    Az = 0,
    /// 俯仰（度）
    El = 1,
    /// 极化（度）
    Pol = 2,
    /// 线性 X
    X = 3,
    /// 线性 Y
    Y = 4,
    /// 线性 V
    V = 5,
}

impl Axis {
    /// 全部轴（按检查顺序）
    pub const ALL: [Axis; 6] = [Axis::Az, Axis::El, Axis::Pol, Axis::X, Axis::Y, Axis::V];

    /// 角度轴（位置事件上报的三个轴）
    pub const ANGULAR: [Axis; 3] = [Axis::Az, Axis::El, Axis::Pol];

    /// 数组下标
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 轴名称（大写缩写）
    pub const fn name(self) -> &'static str {
        match self {
            Axis::Az => "AZ",
            Axis::El => "EL",
            Axis::Pol => "POL",
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::V => "V",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 逐轴映射（固定 6 个元素，按 [`Axis`] 下标访问）
///
/// # 示例
///
/// ```rust
/// use antenna_types::{Axis, AxisMap};
///
/// let mut step = AxisMap::splat(1.0);
/// step[Axis::Az] = 2.5;
/// assert_eq!(step.get(Axis::Az), 2.5);
/// assert_eq!(step.get(Axis::El), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisMap<T> {
    values: [T; 6],
}

impl<T: Copy> AxisMap<T> {
    /// 从数组创建（顺序同 [`Axis::ALL`]）
    pub const fn new(values: [T; 6]) -> Self {
        Self { values }
    }

    /// 所有轴取同一个值
    pub const fn splat(value: T) -> Self {
        Self { values: [value; 6] }
    }

    /// 读取某个轴的值
    pub fn get(&self, axis: Axis) -> T {
        self.values[axis.index()]
    }

    /// 写入某个轴的值
    pub fn set(&mut self, axis: Axis, value: T) {
        self.values[axis.index()] = value;
    }

    /// 链式写入（构造时使用）
    #[must_use]
    pub fn with(mut self, axis: Axis, value: T) -> Self {
        self.set(axis, value);
        self
    }

    /// 按检查顺序遍历 `(轴, 值)`
    pub fn iter(&self) -> impl Iterator<Item = (Axis, T)> + '_ {
        Axis::ALL.into_iter().map(move |axis| (axis, self.get(axis)))
    }

    /// 逐轴变换
    pub fn map<U: Copy>(&self, mut f: impl FnMut(Axis, T) -> U) -> AxisMap<U> {
        AxisMap {
            values: Axis::ALL.map(|axis| f(axis, self.get(axis))),
        }
    }

    /// 原始数组
    pub const fn as_array(&self) -> &[T; 6] {
        &self.values
    }
}

impl<T> Index<Axis> for AxisMap<T> {
    type Output = T;

    fn index(&self, axis: Axis) -> &T {
        &self.values[axis.index()]
    }
}

impl<T> IndexMut<Axis> for AxisMap<T> {
    fn index_mut(&mut self, axis: Axis) -> &mut T {
        &mut self.values[axis.index()]
    }
}

impl AxisMap<f64> {
    /// 只设置角度轴，线性轴为 0
    pub const fn angular(az: f64, el: f64, pol: f64) -> Self {
        Self {
            values: [az, el, pol, 0.0, 0.0, 0.0],
        }
    }
}

/// 单轴运动方向（-1 / 0 / +1）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// 负方向
    Reverse,
    /// 保持不动
    #[default]
    Hold,
    /// 正方向
    Forward,
}

impl Direction {
    /// 乘数
    pub const fn factor(self) -> f64 {
        match self {
            Direction::Reverse => -1.0,
            Direction::Hold => 0.0,
            Direction::Forward => 1.0,
        }
    }

    /// 从任意实数乘数取符号（NaN 视为保持不动）
    pub fn from_factor(factor: f64) -> Self {
        if factor > 0.0 {
            Direction::Forward
        } else if factor < 0.0 {
            Direction::Reverse
        } else {
            Direction::Hold
        }
    }

    /// 从剩余距离推导方向，`|delta| <= epsilon` 视为已到达
    pub fn from_delta(delta: f64, epsilon: f64) -> Self {
        if delta > epsilon {
            Direction::Forward
        } else if delta < -epsilon {
            Direction::Reverse
        } else {
            Direction::Hold
        }
    }

    /// 是否驱动该轴
    pub const fn is_driving(self) -> bool {
        !matches!(self, Direction::Hold)
    }
}

/// 逐轴步长
pub type StepSize = AxisMap<f64>;

/// 逐轴方向向量（开环模式由操作员设置，闭环模式自动推导）
pub type MotionVector = AxisMap<Direction>;

impl StepSize {
    /// 出厂步长：角度轴 1°，线性轴 0.1
    pub const fn factory() -> Self {
        Self::new([1.0, 1.0, 1.0, 0.1, 0.1, 0.1])
    }

    /// 检查被驱动的轴步长是否有效（有限且 > 0）
    ///
    /// 步长为 0 的被驱动轴永远不会前进，闭环模式下会导致永不结束。
    pub fn validate_for(&self, vector: &MotionVector) -> Result<(), DeviceError> {
        for (axis, direction) in vector.iter() {
            let step = self.get(axis);
            if direction.is_driving() && !(step.is_finite() && step > 0.0) {
                return Err(DeviceError::InvalidStep { axis, step });
            }
        }
        Ok(())
    }
}

/// 逐轴限位 `[min, max]`
///
/// 不变式：每个轴 `min <= max`。写入时不做强制（操作员常常先改下限再改上限），
/// 在启动运动和每个 tick 时检查。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionLimits {
    /// 下限
    pub min: AxisMap<f64>,
    /// 上限
    pub max: AxisMap<f64>,
}

impl Default for MotionLimits {
    fn default() -> Self {
        Self {
            min: AxisMap::new([-180.0, -90.0, -180.0, -100.0, -100.0, -100.0]),
            max: AxisMap::new([180.0, 90.0, 180.0, 100.0, 100.0, 100.0]),
        }
    }
}

impl MotionLimits {
    /// 创建限位
    pub const fn new(min: AxisMap<f64>, max: AxisMap<f64>) -> Self {
        Self { min, max }
    }

    /// 检查 `min <= max`（第一个违反的轴）
    pub fn validate(&self) -> Result<(), DeviceError> {
        for axis in Axis::ALL {
            let (min, max) = (self.min.get(axis), self.max.get(axis));
            // NaN 也在这里被拒绝
            if !(min <= max) {
                return Err(DeviceError::InvalidLimits { axis, min, max });
            }
        }
        Ok(())
    }

    /// 数值是否在限位内（允许 `epsilon` 容差）
    pub fn contains(&self, axis: Axis, value: f64, epsilon: f64) -> bool {
        value >= self.min.get(axis) - epsilon && value <= self.max.get(axis) + epsilon
    }

    /// 将数值落到限位上
    ///
    /// - 在限位内：原样返回
    /// - 超出但在容差内：吸附到边界（消除浮点累积造成的边界抖动）
    /// - 超出容差：返回 `None`
    pub fn settle(&self, axis: Axis, value: f64, epsilon: f64) -> Option<f64> {
        if !self.contains(axis, value, epsilon) {
            return None;
        }
        Some(value.max(self.min.get(axis)).min(self.max.get(axis)))
    }
}

/// 定位器位置快照
///
/// 只有当前运动任务可以写入；主机侧只能拿到副本。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionState {
    axes: AxisMap<f64>,
}

impl PositionState {
    /// 从逐轴位置创建
    pub const fn new(axes: AxisMap<f64>) -> Self {
        Self { axes }
    }

    /// 从角度轴创建（线性轴为 0）
    pub const fn angular(az: f64, el: f64, pol: f64) -> Self {
        Self::new(AxisMap::angular(az, el, pol))
    }

    /// 方位
    pub fn az(&self) -> f64 {
        self.axes.get(Axis::Az)
    }

    /// 俯仰
    pub fn el(&self) -> f64 {
        self.axes.get(Axis::El)
    }

    /// 极化
    pub fn pol(&self) -> f64 {
        self.axes.get(Axis::Pol)
    }

    /// 全部轴
    pub const fn axes(&self) -> &AxisMap<f64> {
        &self.axes
    }
}

impl fmt::Display for PositionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AZ={} EL={} POL={}", self.az(), self.el(), self.pol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_roundtrip_u8() {
        for axis in Axis::ALL {
            let raw: u8 = axis.into();
            assert_eq!(Axis::try_from(raw).unwrap(), axis);
        }
        assert!(Axis::try_from(6u8).is_err());
    }

    #[test]
    fn test_axis_map_index_and_with() {
        let map = AxisMap::splat(0.0).with(Axis::Pol, 3.0);
        assert_eq!(map[Axis::Pol], 3.0);
        assert_eq!(map[Axis::Az], 0.0);

        let doubled = map.map(|_, v| v * 2.0);
        assert_eq!(doubled.get(Axis::Pol), 6.0);
    }

    #[test]
    fn test_direction_from_factor() {
        assert_eq!(Direction::from_factor(0.5), Direction::Forward);
        assert_eq!(Direction::from_factor(-3.0), Direction::Reverse);
        assert_eq!(Direction::from_factor(0.0), Direction::Hold);
        assert_eq!(Direction::from_factor(f64::NAN), Direction::Hold);
    }

    #[test]
    fn test_direction_from_delta_respects_epsilon() {
        assert_eq!(Direction::from_delta(1e-12, 1e-9), Direction::Hold);
        assert_eq!(Direction::from_delta(-1.0, 1e-9), Direction::Reverse);
        assert_eq!(Direction::from_delta(2.0, 1e-9), Direction::Forward);
    }

    #[test]
    fn test_default_limits_are_valid() {
        let limits = MotionLimits::default();
        assert!(limits.validate().is_ok());
        assert_eq!(limits.min[Axis::El], -90.0);
        assert_eq!(limits.max[Axis::V], 100.0);
    }

    #[test]
    fn test_inverted_limits_report_first_axis() {
        let mut limits = MotionLimits::default();
        limits.min[Axis::Pol] = 10.0;
        limits.max[Axis::Pol] = -10.0;
        limits.min[Axis::X] = 5.0;
        limits.max[Axis::X] = 0.0;

        match limits.validate() {
            Err(DeviceError::InvalidLimits { axis, .. }) => assert_eq!(axis, Axis::Pol),
            other => panic!("Expected InvalidLimits, got {:?}", other),
        }
    }

    #[test]
    fn test_settle_snaps_within_tolerance() {
        let limits = MotionLimits::new(AxisMap::splat(-5.0), AxisMap::splat(5.0));
        assert_eq!(limits.settle(Axis::Az, 5.0 + 1e-12, 1e-9), Some(5.0));
        assert_eq!(limits.settle(Axis::Az, 4.0, 1e-9), Some(4.0));
        assert_eq!(limits.settle(Axis::Az, 6.0, 1e-9), None);
        assert_eq!(limits.settle(Axis::Az, f64::NAN, 1e-9), None);
    }

    #[test]
    fn test_step_validation_only_checks_driven_axes() {
        let step = StepSize::factory().with(Axis::El, 0.0);
        let vector = MotionVector::default().with(Axis::Az, Direction::Forward);
        assert!(step.validate_for(&vector).is_ok());

        let vector = vector.with(Axis::El, Direction::Reverse);
        match step.validate_for(&vector) {
            Err(DeviceError::InvalidStep { axis, step }) => {
                assert_eq!(axis, Axis::El);
                assert_eq!(step, 0.0);
            },
            other => panic!("Expected InvalidStep, got {:?}", other),
        }
    }

    proptest::proptest! {
        #[test]
        fn prop_settle_never_leaves_limits(value in -400.0f64..400.0, eps in 0.0f64..1e-6) {
            let limits = MotionLimits::default();
            if let Some(settled) = limits.settle(Axis::Az, value, eps) {
                proptest::prop_assert!(settled >= -180.0 && settled <= 180.0);
                proptest::prop_assert!((settled - value).abs() <= eps + 1e-9);
            } else {
                proptest::prop_assert!(!(-180.0 - eps..=180.0 + eps).contains(&value));
            }
        }
    }

    #[test]
    fn test_position_display() {
        let pos = PositionState::angular(1.0, -2.0, 3.5);
        assert_eq!(pos.to_string(), "AZ=1 EL=-2 POL=3.5");
    }
}
