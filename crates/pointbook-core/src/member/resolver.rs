//! Membership & Exception Resolver
//!
//! メンバーのTierとカテゴリ単位の例外（必要ポイントの上書き）を解決する。

use super::types::{Member, PointException, Tier};

/// メンバーのTierを取得
pub fn tier_for(member: &Member) -> Tier {
    member.tier
}

/// カテゴリ名に対する例外値を取得
///
/// 名前は正規化して比較する。例外は名前が一致したカテゴリにのみ適用され、
/// 親子カテゴリには波及しない。
pub fn requirement_override(member: &Member, category_name: &str) -> Option<i64> {
    member
        .exceptions
        .iter()
        .find(|exc| exc.applies_to(category_name))
        .map(|exc| exc.points_needed)
}

/// 例外を作成または更新
///
/// 同じカテゴリ名（正規化後）の例外があれば値を上書きし、なければ追加する。
/// 戻り値は例外のインデックス。
pub fn upsert_exception(member: &mut Member, category_name: &str, points_needed: i64) -> usize {
    if let Some(index) = member
        .exceptions
        .iter()
        .position(|exc| exc.applies_to(category_name))
    {
        member.exceptions[index].points_needed = points_needed;
        return index;
    }

    member.exceptions.push(PointException {
        category: category_name.to_string(),
        points_needed,
    });
    member.exceptions.len() - 1
}
