//! 派生指标：GPA 与成绩颜色
//!
//! 纯函数，对任意实数输入（含负数、超过 100、NaN）都有定义。

use std::fmt;

use serde::Serialize;

use crate::model::Course;

/// 成绩颜色标签
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Green,
    Blue,
    Yellow,
    Orange,
    Red,
}

impl ColorTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorTag::Green => "green",
            ColorTag::Blue => "blue",
            ColorTag::Yellow => "yellow",
            ColorTag::Orange => "orange",
            ColorTag::Red => "red",
        }
    }
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 百分比 → 绩点：>=90 4.0，>=80 3.0，>=70 2.0，>=60 1.0，其余 0.0
pub fn grade_point(percentage: f64) -> f64 {
    match percentage {
        p if p >= 90.0 => 4.0,
        p if p >= 80.0 => 3.0,
        p if p >= 70.0 => 2.0,
        p if p >= 60.0 => 1.0,
        _ => 0.0,
    }
}

/// 各课程绩点的平均值，保留两位小数；没有课程时为 "N/A"
pub fn compute_gpa(courses: &[Course]) -> String {
    if courses.is_empty() {
        return "N/A".to_string();
    }
    let total: f64 = courses.iter().map(|c| grade_point(c.percentage)).sum();
    format!("{:.2}", total / courses.len() as f64)
}

pub fn grade_color(percentage: f64) -> ColorTag {
    match percentage {
        p if p >= 90.0 => ColorTag::Green,
        p if p >= 80.0 => ColorTag::Blue,
        p if p >= 70.0 => ColorTag::Yellow,
        p if p >= 60.0 => ColorTag::Orange,
        _ => ColorTag::Red,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(percentage: f64) -> Course {
        Course {
            id: String::new(),
            name: "Course".into(),
            teacher: "Teacher".into(),
            period: String::new(),
            grade: String::new(),
            percentage,
            assignments: Vec::new(),
        }
    }

    #[test]
    fn test_gpa_empty() {
        assert_eq!(compute_gpa(&[]), "N/A");
    }

    #[test]
    fn test_gpa_average() {
        assert_eq!(compute_gpa(&[course(95.0), course(85.0)]), "3.50");
        assert_eq!(compute_gpa(&[course(100.0)]), "4.00");
        assert_eq!(compute_gpa(&[course(72.0), course(61.0), course(10.0)]), "1.00");
    }

    #[test]
    fn test_gpa_out_of_range() {
        assert_eq!(compute_gpa(&[course(-20.0), course(140.0)]), "2.00");
        assert_eq!(compute_gpa(&[course(f64::NAN)]), "0.00");
    }

    #[test]
    fn test_grade_point_breakpoints() {
        assert_eq!(grade_point(90.0), 4.0);
        assert_eq!(grade_point(89.99), 3.0);
        assert_eq!(grade_point(80.0), 3.0);
        assert_eq!(grade_point(70.0), 2.0);
        assert_eq!(grade_point(60.0), 1.0);
        assert_eq!(grade_point(59.9), 0.0);
    }

    #[test]
    fn test_grade_color() {
        assert_eq!(grade_color(90.0), ColorTag::Green);
        assert_eq!(grade_color(89.9), ColorTag::Blue);
        assert_eq!(grade_color(75.0), ColorTag::Yellow);
        assert_eq!(grade_color(60.0), ColorTag::Orange);
        assert_eq!(grade_color(59.9), ColorTag::Red);
        assert_eq!(grade_color(-5.0), ColorTag::Red);
        assert_eq!(grade_color(250.0), ColorTag::Green);
        assert_eq!(grade_color(f64::NAN), ColorTag::Red);
        assert_eq!(grade_color(90.0).to_string(), "green");
    }
}
